//! Message Buffer (C1, §4.1).
//!
//! Accumulates outbound messages per unit of work, grouped by topic, and flushes
//! them atomically at the end of that unit of work. Messages for the same topic
//! keep insertion order; the buffer does not claim cross-topic atomicity against
//! the broker, only that it attempts each topic's queue at most once per flush.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::{OutboundMessage, Topic};
use crate::error::SagaError;

/// Collaborator that actually hands a message to the event bus. Implemented by the
/// Kafka producer wiring in the `api` crate; kept as a trait here so the executor
/// and dispatch table stay broker-agnostic and unit-testable.
#[async_trait]
pub trait MessageProducer: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), SagaError>;
}

#[derive(Debug, Default)]
pub struct MessageBuffer {
    queues: HashMap<Topic, Vec<OutboundMessage>>,
}

impl MessageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends messages produced for this unit of work, preserving the order in
    /// which they're handed in.
    pub fn put(&mut self, messages: impl IntoIterator<Item = OutboundMessage>) {
        for message in messages {
            self.queues.entry(message.topic).or_default().push(message);
        }
    }

    pub fn get_all(&self) -> &HashMap<Topic, Vec<OutboundMessage>> {
        &self.queues
    }

    pub fn is_empty(&self) -> bool {
        self.queues.values().all(|q| q.is_empty())
    }

    /// Flushes every topic's queue through `producer`, one message at a time in
    /// insertion order. Keeps going across topics even if one topic fails, since
    /// downstream must already tolerate partial delivery (§4.1); the first error
    /// encountered is returned to the caller once every topic has been attempted.
    pub async fn flush(self, producer: &dyn MessageProducer) -> Result<(), SagaError> {
        let mut first_error = None;
        for (_, messages) in self.queues {
            for message in &messages {
                if let Err(e) = producer.send(message).await {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

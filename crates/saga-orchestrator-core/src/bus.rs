//! Collaborator seams (§4.6, §4.7).
//!
//! `MessageProducer` (buffer.rs) and `ValidationClient` here are the two points
//! where this crate reaches outside itself — the Kafka wiring and the HTTP call to
//! the query aggregator. Keeping them as traits lets the executor and correlator be
//! exercised with fakes instead of a live broker.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ConditionInput;
use crate::domain::ValidationResult;
use crate::dispatch::EventTopic;
use crate::error::SagaResult;

/// A downstream status event, already deserialized far enough to correlate: which
/// topic it arrived on, its semantic type, the saga it claims to belong to, and the
/// raw body for anything the executor needs from it (e.g. an asset's `slot`).
#[derive(Debug, Clone)]
pub struct StatusEvent {
    pub topic: EventTopic,
    pub event_type: String,
    pub transaction_id: Uuid,
    pub body: Value,
}

/// Synchronous collaborator for `validate_character_state` steps (§4.7, C7).
#[async_trait]
pub trait ValidationClient: Send + Sync {
    async fn validate_character_state(
        &self,
        character_id: u32,
        conditions: &[ConditionInput],
    ) -> SagaResult<ValidationResult>;
}

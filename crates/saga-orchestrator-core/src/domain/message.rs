//! Outbound Message (§3).

use serde_json::Value;

/// A single message an emitter wants published. `topic` is a logical topic name
/// (resolved to a broker topic string by the caller), `key` preserves per-entity
/// ordering, and `value` is the JSON envelope body.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub topic: Topic,
    pub key: String,
    pub value: Value,
}

/// Logical topics an emitter can target; resolved to a concrete Kafka topic string
/// by `TopicConfig` (§6.4) at the bus boundary rather than hardcoded here, keeping
/// the core crate broker-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    CommandCharacter,
    CommandCompartment,
    CommandSkill,
    CommandGuild,
    CommandInvite,
}

impl OutboundMessage {
    pub fn new(topic: Topic, key: impl Into<String>, value: Value) -> Self {
        Self {
            topic,
            key: key.into(),
            value,
        }
    }
}

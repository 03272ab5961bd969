//! Kafka bus wiring: the outbound producer and the inbound consumer loops.

pub mod consumer;
pub mod producer;

pub use consumer::{run_saga_command_consumer, run_status_consumer};
pub use producer::KafkaProducer;

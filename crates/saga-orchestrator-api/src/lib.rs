//! Bus wiring, the validation HTTP client, and the read-only REST surface that sit
//! around `saga-orchestrator-core`'s in-process state machine.

pub mod api;
pub mod kafka;
pub mod telemetry;
pub mod tenant;
pub mod validation_client;

pub use kafka::KafkaProducer;
pub use validation_client::HttpValidationClient;

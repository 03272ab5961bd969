//! Saga state machine, command dispatch, and event correlation for the orchestrator.
//!
//! This crate owns the data model and the three subsystems described by the
//! system: the executor that drives a saga's steps, the dispatch table that maps
//! an action to its outbound messages and completion predicate, and the
//! correlator that resolves inbound status events back to the step awaiting them.
//! Everything that talks to a real broker, HTTP endpoint, or the outside clock
//! lives behind the traits in `bus`/`buffer` so this crate stays testable without
//! any of it running.

pub mod buffer;
pub mod bus;
pub mod config;
pub mod correlator;
pub mod dispatch;
pub mod domain;
pub mod emitters;
pub mod error;
pub mod executor;
pub mod store;

pub use bus::{StatusEvent, ValidationClient};
pub use buffer::{MessageBuffer, MessageProducer};
pub use config::{ConfigError, SagaConfig, TopicConfig};
pub use correlator::Correlator;
pub use dispatch::{Completion, EventTopic};
pub use domain::{
    ConditionInput, ConditionOperator, ConditionResult, ConditionType, OutboundMessage, Saga, SagaOutcome,
    SagaType, Step, StepPayload, StepStatus, Topic, ValidationResult,
};
pub use error::{SagaError, SagaResult};
pub use executor::SagaExecutor;
pub use store::SagaStore;

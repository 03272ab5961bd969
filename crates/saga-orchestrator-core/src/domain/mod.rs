//! Data model (§3): sagas, steps, actions, outbound messages, and validation shapes.

pub mod action;
pub mod message;
pub mod saga;
pub mod validation;

pub use action::{ConditionInput, ConditionOperator, ConditionType, StepPayload};
pub use message::{OutboundMessage, Topic};
pub use saga::{Saga, SagaOutcome, SagaType, Step, StepStatus};
pub use validation::{ConditionResult, ValidationResult};

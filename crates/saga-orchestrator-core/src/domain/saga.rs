//! Saga and Step (§3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::StepPayload;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SagaType {
    InventoryTransaction,
    QuestReward,
    TradeTransaction,
    GuildManagement,
    CharacterCreation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Executing,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub step_id: String,
    pub status: StepStatus,
    pub payload: StepPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub compensation: Option<StepPayload>,
}

/// On-the-wire shape of a step: `action`/`payload` are siblings of `stepId` rather
/// than a nested object, so `StepPayload`'s own adjacent tagging is re-split by hand
/// instead of relying on `#[serde(flatten)]` over an enum (which is unreliable across
/// serde_json versions for adjacently-tagged enums).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepWire {
    step_id: String,
    #[serde(default = "StepStatus::pending")]
    status: StepStatus,
    action: String,
    payload: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    compensation: Option<CompensationWire>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompensationWire {
    action: String,
    payload: serde_json::Value,
}

impl StepStatus {
    fn pending() -> Self {
        StepStatus::Pending
    }
}

fn split_tagged(payload: &StepPayload) -> serde_json::Result<(String, serde_json::Value)> {
    let mut value = serde_json::to_value(payload)?;
    let obj = value.as_object_mut().expect("StepPayload serializes to an object");
    let action = obj
        .remove("action")
        .and_then(|v| v.as_str().map(str::to_string))
        .expect("StepPayload always carries an action tag");
    let payload = obj.remove("payload").unwrap_or(serde_json::Value::Null);
    Ok((action, payload))
}

fn join_tagged<'de, D>(action: String, payload: serde_json::Value) -> Result<StepPayload, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let tagged = serde_json::json!({"action": action, "payload": payload});
    serde_json::from_value(tagged).map_err(serde::de::Error::custom)
}

impl Serialize for Step {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let (action, payload) = split_tagged(&self.payload).map_err(serde::ser::Error::custom)?;
        let compensation = match &self.compensation {
            Some(c) => {
                let (action, payload) = split_tagged(c).map_err(serde::ser::Error::custom)?;
                Some(CompensationWire { action, payload })
            }
            None => None,
        };
        StepWire {
            step_id: self.step_id.clone(),
            status: self.status,
            action,
            payload,
            created_at: self.created_at,
            updated_at: self.updated_at,
            compensation,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Step {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = StepWire::deserialize(deserializer)?;
        let payload = join_tagged::<D>(wire.action, wire.payload)?;
        let compensation = match wire.compensation {
            Some(c) => Some(join_tagged::<D>(c.action, c.payload)?),
            None => None,
        };
        Ok(Step {
            step_id: wire.step_id,
            // §6.1: the inbound status is ignored; every deserialized step starts Pending.
            status: StepStatus::Pending,
            payload,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            compensation,
        })
    }
}

impl Step {
    /// A freshly-ingested step always starts `Pending`; the inbound `status` field
    /// is ignored per §6.1.
    pub fn new(step_id: String, payload: StepPayload, compensation: Option<StepPayload>) -> Self {
        let now = Utc::now();
        Self {
            step_id,
            status: StepStatus::Pending,
            payload,
            created_at: now,
            updated_at: now,
            compensation,
        }
    }

    pub fn action_name(&self) -> &'static str {
        self.payload.action_name()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saga {
    pub transaction_id: Uuid,
    pub saga_type: SagaType,
    pub initiated_by: String,
    pub tenant_id: String,
    pub steps: Vec<Step>,
}

/// Outcome of a saga that has reached a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaOutcome {
    Completed,
    Failed,
}

impl Saga {
    /// Index of the first `Pending` step, i.e. the step `advance` will dispatch next
    /// (§3 "Derived: currentStepIndex").
    pub fn current_step_index(&self) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.status == StepStatus::Pending)
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.current_step_index().map(|i| &self.steps[i])
    }

    pub fn current_step_mut(&mut self) -> Option<&mut Step> {
        let idx = self.current_step_index()?;
        Some(&mut self.steps[idx])
    }

    /// The step currently `Executing`, if any (P1: at most one).
    pub fn executing_step_mut(&mut self) -> Option<&mut Step> {
        self.steps
            .iter_mut()
            .find(|s| s.status == StepStatus::Executing)
    }

    pub fn executing_step(&self) -> Option<&Step> {
        self.steps.iter().find(|s| s.status == StepStatus::Executing)
    }

    /// Whether every step has reached a terminal status (P3).
    pub fn is_terminal(&self) -> bool {
        self.steps
            .iter()
            .all(|s| matches!(s.status, StepStatus::Completed | StepStatus::Failed))
    }

    /// `Completed` iff all steps completed; `Failed` iff any step failed. `None`
    /// while the saga is still in flight.
    pub fn outcome(&self) -> Option<SagaOutcome> {
        if !self.is_terminal() {
            return None;
        }
        if self.steps.iter().any(|s| s.status == StepStatus::Failed) {
            Some(SagaOutcome::Failed)
        } else {
            Some(SagaOutcome::Completed)
        }
    }

    /// Inserts `step` immediately after the index currently `Executing` (§4.5.6).
    /// Caller must hold the per-saga lock and call this before completing the
    /// originating step, per §9 "Dynamic insertion".
    pub fn insert_after_executing(&mut self, step: Step) -> Result<(), crate::error::SagaError> {
        let idx = self
            .steps
            .iter()
            .position(|s| s.status == StepStatus::Executing)
            .ok_or_else(|| crate::error::SagaError::DispatchFailed {
                message: "no executing step to insert after".to_string(),
            })?;
        self.steps.insert(idx + 1, step);
        Ok(())
    }

    /// B1: a saga with no steps is rejected at ingest.
    pub fn validate(&self) -> Result<(), crate::error::SagaError> {
        if self.steps.is_empty() {
            return Err(crate::error::SagaError::EmptySteps);
        }
        let mut seen = std::collections::HashSet::new();
        for step in &self.steps {
            step.payload.validate()?;
            if !seen.insert(&step.step_id) {
                return Err(crate::error::SagaError::InvalidPayload {
                    action: step.action_name().to_string(),
                    message: format!("duplicate step id {}", step.step_id),
                });
            }
        }
        Ok(())
    }
}

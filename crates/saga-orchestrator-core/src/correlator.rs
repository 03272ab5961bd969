//! Event Correlator (C6, §4.6).

use std::sync::Arc;

use crate::bus::StatusEvent;
use crate::dispatch::{completion_for, triggers_auto_equip, Completion};
use crate::executor::SagaExecutor;
use crate::store::SagaStore;

pub struct Correlator {
    store: Arc<SagaStore>,
    executor: Arc<SagaExecutor>,
}

impl Correlator {
    pub fn new(store: Arc<SagaStore>, executor: Arc<SagaExecutor>) -> Self {
        Self { store, executor }
    }

    /// Resolves an incoming status event to the saga waiting on it and applies the
    /// corresponding completion, or drops the event. Never propagates an error:
    /// consumers must always acknowledge after handling (§7, at-least-once).
    pub async fn handle(&self, event: StatusEvent) {
        let saga = match self.store.get_by_id(event.transaction_id).await {
            Ok(saga) => saga,
            Err(_) => {
                tracing::debug!(
                    transaction_id = %event.transaction_id,
                    event_type = %event.event_type,
                    "no saga for transaction id, dropping correlation event"
                );
                return;
            }
        };

        let Some(executing) = saga.executing_step() else {
            tracing::debug!(
                transaction_id = %event.transaction_id,
                "saga has no executing step, dropping correlation event"
            );
            return;
        };
        let action_name = executing.action_name();

        if triggers_auto_equip(action_name, event.topic, &event.event_type) {
            let slot = event
                .body
                .get("slot")
                .and_then(|v| v.as_i64())
                .unwrap_or(-1) as i16;
            if let Err(error) = self
                .executor
                .complete_create_and_equip(event.transaction_id, slot)
                .await
            {
                tracing::warn!(%error, "failed to splice auto-equip step");
            }
            return;
        }

        match completion_for(action_name, event.topic, &event.event_type) {
            Some(Completion::Success) => {
                if let Err(error) = self.executor.step_completed(event.transaction_id, true).await {
                    tracing::warn!(%error, "failed to apply step completion");
                }
            }
            Some(Completion::Failure) => {
                if let Err(error) = self.executor.step_completed(event.transaction_id, false).await {
                    tracing::warn!(%error, "failed to apply step failure");
                }
            }
            None => {
                tracing::debug!(
                    action = action_name,
                    event_type = %event.event_type,
                    "event type not recognized for the saga's current action, dropping"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ValidationClient;
    use crate::buffer::MessageProducer;
    use crate::dispatch::EventTopic;
    use crate::domain::action::{AwardMesosPayload, ConditionInput};
    use crate::domain::{OutboundMessage, Saga, SagaOutcome, SagaType, Step, StepPayload, StepStatus, ValidationResult};
    use crate::error::SagaResult;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct NoopProducer;
    #[async_trait]
    impl MessageProducer for NoopProducer {
        async fn send(&self, _message: &OutboundMessage) -> SagaResult<()> {
            Ok(())
        }
    }

    struct UnusedValidationClient;
    #[async_trait]
    impl ValidationClient for UnusedValidationClient {
        async fn validate_character_state(
            &self,
            character_id: u32,
            _conditions: &[ConditionInput],
        ) -> SagaResult<ValidationResult> {
            Ok(ValidationResult {
                character_id,
                passed: true,
                results: vec![],
            })
        }
    }

    fn mesos_saga(id: Uuid) -> Saga {
        Saga {
            transaction_id: id,
            saga_type: SagaType::InventoryTransaction,
            initiated_by: "test".to_string(),
            tenant_id: "tenant-a".to_string(),
            steps: vec![Step::new(
                "step-1".to_string(),
                StepPayload::AwardMesos(AwardMesosPayload {
                    character_id: 12345,
                    world_id: 0,
                    channel_id: 0,
                    actor_id: 0,
                    actor_type: "SYSTEM".to_string(),
                    amount: 1000,
                }),
                None,
            )],
        }
    }

    #[tokio::test]
    async fn meso_changed_event_completes_the_saga() {
        let store = Arc::new(SagaStore::new());
        let executor = Arc::new(SagaExecutor::new(
            store.clone(),
            Arc::new(NoopProducer),
            Arc::new(UnusedValidationClient),
        ));
        let correlator = Correlator::new(store.clone(), executor.clone());

        let id = Uuid::new_v4();
        executor.ingest(mesos_saga(id)).await.unwrap();

        correlator
            .handle(StatusEvent {
                topic: EventTopic::CharacterStatus,
                event_type: "MESO_CHANGED".to_string(),
                transaction_id: id,
                body: serde_json::json!({}),
            })
            .await;

        let saga = store.get_by_id(id).await.unwrap();
        assert_eq!(saga.outcome(), Some(SagaOutcome::Completed));
    }

    #[tokio::test]
    async fn event_for_unknown_transaction_id_is_dropped_without_panicking() {
        let store = Arc::new(SagaStore::new());
        let executor = Arc::new(SagaExecutor::new(
            store.clone(),
            Arc::new(NoopProducer),
            Arc::new(UnusedValidationClient),
        ));
        let correlator = Correlator::new(store, executor);

        correlator
            .handle(StatusEvent {
                topic: EventTopic::CharacterStatus,
                event_type: "MESO_CHANGED".to_string(),
                transaction_id: Uuid::new_v4(),
                body: serde_json::json!({}),
            })
            .await;
    }

    #[tokio::test]
    async fn event_type_not_matching_current_action_is_dropped() {
        let store = Arc::new(SagaStore::new());
        let executor = Arc::new(SagaExecutor::new(
            store.clone(),
            Arc::new(NoopProducer),
            Arc::new(UnusedValidationClient),
        ));
        let correlator = Correlator::new(store.clone(), executor.clone());

        let id = Uuid::new_v4();
        executor.ingest(mesos_saga(id)).await.unwrap();

        correlator
            .handle(StatusEvent {
                topic: EventTopic::CharacterStatus,
                event_type: "JOB_CHANGED".to_string(),
                transaction_id: id,
                body: serde_json::json!({}),
            })
            .await;

        let saga = store.get_by_id(id).await.unwrap();
        assert_eq!(saga.steps[0].status, StepStatus::Executing);
    }
}

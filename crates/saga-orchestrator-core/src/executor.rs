//! Saga Executor (C5, §4.5).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::buffer::{MessageBuffer, MessageProducer};
use crate::bus::ValidationClient;
use crate::domain::action::EquipAssetPayload;
use crate::domain::{Saga, Step, StepPayload, StepStatus};
use crate::emitters::emit;
use crate::error::{SagaError, SagaResult};
use crate::store::SagaStore;

pub struct SagaExecutor {
    store: Arc<SagaStore>,
    producer: Arc<dyn MessageProducer>,
    validation_client: Arc<dyn ValidationClient>,
}

impl SagaExecutor {
    pub fn new(
        store: Arc<SagaStore>,
        producer: Arc<dyn MessageProducer>,
        validation_client: Arc<dyn ValidationClient>,
    ) -> Self {
        Self {
            store,
            producer,
            validation_client,
        }
    }

    /// Ingests a new saga command (§4.5.1): validates it, stores it with every step
    /// `Pending`, and kicks off the first `advance`. A resubmission of an already
    /// known transaction id is stored as a no-op and not re-advanced (§9, R1).
    pub async fn ingest(&self, saga: Saga) -> SagaResult<Uuid> {
        saga.validate()?;
        let transaction_id = saga.transaction_id;
        if self.store.put(saga) {
            self.advance(transaction_id).await?;
        }
        Ok(transaction_id)
    }

    /// Drives the saga's current step to dispatch (§4.5.2).
    pub async fn advance(&self, transaction_id: Uuid) -> SagaResult<()> {
        self.store
            .with_locked(transaction_id, |saga| self.advance_locked(saga))
            .await
    }

    fn advance_locked<'a>(
        &'a self,
        saga: &'a mut Saga,
    ) -> Pin<Box<dyn Future<Output = SagaResult<()>> + Send + 'a>> {
        Box::pin(async move {
            let Some(idx) = saga.current_step_index() else {
                return Ok(());
            };
            saga.steps[idx].status = StepStatus::Executing;
            saga.steps[idx].updated_at = Utc::now();
            let payload = saga.steps[idx].payload.clone();
            let transaction_id = saga.transaction_id;

            if payload.is_synchronous() {
                let success = self.run_validation(&payload).await;
                return self.apply_completion_locked(saga, success).await;
            }

            let messages = emit(transaction_id, &payload);
            let mut buffer = MessageBuffer::new();
            buffer.put(messages);
            match buffer.flush(self.producer.as_ref()).await {
                Ok(()) => Ok(()),
                Err(_) => self.apply_completion_locked(saga, false).await,
            }
        })
    }

    async fn run_validation(&self, payload: &StepPayload) -> bool {
        let StepPayload::ValidateCharacterState(p) = payload else {
            return false;
        };
        match self
            .validation_client
            .validate_character_state(p.character_id, &p.conditions)
            .await
        {
            Ok(result) => result.passed,
            Err(_) => false,
        }
    }

    /// Invoked by the correlator (or by this executor itself, for synchronous
    /// actions) to resolve the currently `Executing` step (§4.5.3).
    pub async fn step_completed(&self, transaction_id: Uuid, success: bool) -> SagaResult<()> {
        self.store
            .with_locked(transaction_id, |saga| {
                Box::pin(async move {
                    if saga.executing_step().is_none() {
                        return Ok(()); // P5: late or duplicate signal, no-op.
                    }
                    self.apply_completion_locked(saga, success).await
                })
            })
            .await
    }

    /// Splices the auto-equip step generated by an asset-creation event for a
    /// `create_and_equip_asset` step, then completes the originating step (§4.5.6,
    /// P6). Insertion happens before the completion is applied, in the same
    /// critical section, so `advance` cannot skip it.
    pub async fn complete_create_and_equip(&self, transaction_id: Uuid, slot: i16) -> SagaResult<()> {
        self.store
            .with_locked(transaction_id, |saga| {
                Box::pin(async move {
                    let Some(idx) = saga.steps.iter().position(|s| s.status == StepStatus::Executing) else {
                        return Ok(());
                    };
                    let character_id = match &saga.steps[idx].payload {
                        StepPayload::CreateAndEquipAsset(p) => p.character_id,
                        _ => {
                            return Err(SagaError::DispatchFailed {
                                message: "auto-equip triggered for a non-create_and_equip_asset step"
                                    .to_string(),
                            })
                        }
                    };
                    let auto_equip = Step::new(
                        format!("auto_equip_step_{}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
                        StepPayload::EquipAsset(EquipAssetPayload {
                            character_id,
                            inventory_type: 1,
                            source: slot,
                            destination: -1,
                        }),
                        None,
                    );
                    saga.insert_after_executing(auto_equip)?;
                    saga.steps[idx].status = StepStatus::Completed;
                    saga.steps[idx].updated_at = Utc::now();
                    self.advance_locked(saga).await
                })
            })
            .await
    }

    async fn apply_completion_locked(&self, saga: &mut Saga, success: bool) -> SagaResult<()> {
        let Some(idx) = saga.steps.iter().position(|s| s.status == StepStatus::Executing) else {
            return Ok(());
        };
        let now = Utc::now();
        if success {
            saga.steps[idx].status = StepStatus::Completed;
            saga.steps[idx].updated_at = now;
            self.advance_locked(saga).await
        } else {
            saga.steps[idx].status = StepStatus::Failed;
            saga.steps[idx].updated_at = now;
            self.compensate_locked(saga, idx).await
        }
    }

    /// Compensation (§4.5.5): any not-yet-dispatched steps after the failure are
    /// abandoned (marked `Failed`, they will never run), then a compensating step
    /// is appended for the failed step's own compensation followed by every
    /// previously-completed step's compensation in reverse order. Draining that
    /// sequence is what lets the saga reach a terminal `Failed` state (P3).
    async fn compensate_locked(&self, saga: &mut Saga, failed_idx: usize) -> SagaResult<()> {
        let now = Utc::now();
        for step in saga.steps.iter_mut().skip(failed_idx + 1) {
            if step.status == StepStatus::Pending {
                step.status = StepStatus::Failed;
                step.updated_at = now;
            }
        }

        let mut insert_pos = failed_idx + 1;
        let mut inserted_any = false;

        if let Some(compensation) = saga.steps[failed_idx].compensation.clone() {
            saga.steps
                .insert(insert_pos, compensation_step(compensation));
            insert_pos += 1;
            inserted_any = true;
        }
        for i in (0..failed_idx).rev() {
            if let Some(compensation) = saga.steps[i].compensation.clone() {
                saga.steps.insert(insert_pos, compensation_step(compensation));
                insert_pos += 1;
                inserted_any = true;
            }
        }

        if inserted_any {
            self.advance_locked(saga).await
        } else {
            Ok(())
        }
    }
}

fn compensation_step(payload: StepPayload) -> Step {
    Step::new(
        format!("compensation_step_{}", Uuid::new_v4().as_simple()),
        payload,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ValidationClient;
    use crate::domain::action::{AwardMesosPayload, CreateAndEquipAssetPayload, ItemStack};
    use crate::domain::{ConditionInput, SagaType, ValidationResult};
    use crate::error::SagaResult;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingProducer {
        sent: StdMutex<Vec<crate::domain::OutboundMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl MessageProducer for RecordingProducer {
        async fn send(&self, message: &crate::domain::OutboundMessage) -> SagaResult<()> {
            if self.fail {
                return Err(SagaError::DispatchFailed {
                    message: "boom".to_string(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct AlwaysPasses;
    #[async_trait]
    impl ValidationClient for AlwaysPasses {
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

    struct AlwaysFails;
    #[async_trait]
    impl ValidationClient for AlwaysFails {
        async fn validate_character_state(
            &self,
            character_id: u32,
            _conditions: &[ConditionInput],
        ) -> SagaResult<ValidationResult> {
            Ok(ValidationResult {
                character_id,
                passed: false,
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
    async fn award_mesos_happy_path_dispatches_then_completes() {
        let store = Arc::new(SagaStore::new());
        let producer = Arc::new(RecordingProducer::default());
        let executor = SagaExecutor::new(store.clone(), producer.clone(), Arc::new(AlwaysPasses));

        let id = Uuid::new_v4();
        executor.ingest(mesos_saga(id)).await.unwrap();
        assert_eq!(producer.sent.lock().unwrap().len(), 1);

        executor.step_completed(id, true).await.unwrap();
        let saga = store.get_by_id(id).await.unwrap();
        assert_eq!(saga.steps[0].status, StepStatus::Completed);
        assert_eq!(saga.outcome(), Some(crate::domain::SagaOutcome::Completed));
    }

    #[tokio::test]
    async fn dispatch_failure_fails_the_step_with_no_compensation() {
        let store = Arc::new(SagaStore::new());
        let producer = Arc::new(RecordingProducer {
            fail: true,
            ..Default::default()
        });
        let executor = SagaExecutor::new(store.clone(), producer, Arc::new(AlwaysPasses));

        let id = Uuid::new_v4();
        executor.ingest(mesos_saga(id)).await.unwrap();
        let saga = store.get_by_id(id).await.unwrap();
        assert_eq!(saga.steps[0].status, StepStatus::Failed);
        assert_eq!(saga.outcome(), Some(crate::domain::SagaOutcome::Failed));
    }

    #[tokio::test]
    async fn synchronous_validation_failure_fails_without_dispatch() {
        let store = Arc::new(SagaStore::new());
        let producer = Arc::new(RecordingProducer::default());
        let executor = SagaExecutor::new(store.clone(), producer.clone(), Arc::new(AlwaysFails));

        let id = Uuid::new_v4();
        let saga = Saga {
            transaction_id: id,
            saga_type: SagaType::QuestReward,
            initiated_by: "test".to_string(),
            tenant_id: "tenant-a".to_string(),
            steps: vec![Step::new(
                "step-1".to_string(),
                StepPayload::ValidateCharacterState(crate::domain::action::ValidateCharacterStatePayload {
                    character_id: 12345,
                    conditions: vec![],
                }),
                None,
            )],
        };
        executor.ingest(saga).await.unwrap();
        assert!(producer.sent.lock().unwrap().is_empty());
        let saga = store.get_by_id(id).await.unwrap();
        assert_eq!(saga.steps[0].status, StepStatus::Failed);
    }

    #[tokio::test]
    async fn create_and_equip_asset_inserts_auto_equip_step_before_completing() {
        let store = Arc::new(SagaStore::new());
        let producer = Arc::new(RecordingProducer::default());
        let executor = SagaExecutor::new(store.clone(), producer, Arc::new(AlwaysPasses));

        let id = Uuid::new_v4();
        let saga = Saga {
            transaction_id: id,
            saga_type: SagaType::InventoryTransaction,
            initiated_by: "test".to_string(),
            tenant_id: "tenant-a".to_string(),
            steps: vec![Step::new(
                "step-1".to_string(),
                StepPayload::CreateAndEquipAsset(CreateAndEquipAssetPayload {
                    character_id: 12345,
                    item: ItemStack {
                        template_id: 1302000,
                        quantity: 1,
                    },
                }),
                None,
            )],
        };
        executor.ingest(saga).await.unwrap();

        executor.complete_create_and_equip(id, 5).await.unwrap();
        let saga = store.get_by_id(id).await.unwrap();
        assert_eq!(saga.steps.len(), 2);
        assert_eq!(saga.steps[0].status, StepStatus::Completed);
        assert_eq!(saga.steps[1].step_id.starts_with("auto_equip_step_"), true);
        match &saga.steps[1].payload {
            StepPayload::EquipAsset(p) => {
                assert_eq!(p.source, 5);
                assert_eq!(p.destination, -1);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failure_with_compensation_runs_it_then_terminates_failed() {
        let store = Arc::new(SagaStore::new());
        let producer = Arc::new(RecordingProducer::default());
        let executor = SagaExecutor::new(store.clone(), producer.clone(), Arc::new(AlwaysPasses));

        let id = Uuid::new_v4();
        let saga = Saga {
            transaction_id: id,
            saga_type: SagaType::TradeTransaction,
            initiated_by: "test".to_string(),
            tenant_id: "tenant-a".to_string(),
            steps: vec![Step::new(
                "step-1".to_string(),
                StepPayload::AwardMesos(AwardMesosPayload {
                    character_id: 1,
                    world_id: 0,
                    channel_id: 0,
                    actor_id: 0,
                    actor_type: "SYSTEM".to_string(),
                    amount: 500,
                }),
                Some(StepPayload::AwardMesos(AwardMesosPayload {
                    character_id: 1,
                    world_id: 0,
                    channel_id: 0,
                    actor_id: 0,
                    actor_type: "SYSTEM".to_string(),
                    amount: -500,
                })),
            )],
        };
        executor.ingest(saga).await.unwrap();
        executor.step_completed(id, false).await.unwrap();

        let saga = store.get_by_id(id).await.unwrap();
        assert_eq!(saga.steps.len(), 2);
        assert!(saga.steps[1].step_id.starts_with("compensation_step_"));
        assert_eq!(producer.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn late_completion_with_no_executing_step_is_a_no_op() {
        let store = Arc::new(SagaStore::new());
        let producer = Arc::new(RecordingProducer::default());
        let executor = SagaExecutor::new(store.clone(), producer, Arc::new(AlwaysPasses));

        let id = Uuid::new_v4();
        executor.ingest(mesos_saga(id)).await.unwrap();
        executor.step_completed(id, true).await.unwrap();
        // Saga is now terminal; a duplicate completion must not panic or error.
        executor.step_completed(id, true).await.unwrap();
    }
}

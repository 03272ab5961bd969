//! Saga Store (C4, §4.4).
//!
//! In-memory, tenant-scoped, keyed by transaction id. Each saga is wrapped in its
//! own `tokio::sync::Mutex` so mutation of one saga never blocks another, while a
//! `RwLock` over the map itself lets readers and the rare new-saga insert proceed
//! without contending on a single global lock.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::Saga;
use crate::error::{SagaError, SagaResult};

#[derive(Clone)]
struct Entry {
    tenant_id: String,
    saga: Arc<Mutex<Saga>>,
}

#[derive(Default)]
pub struct SagaStore {
    sagas: RwLock<HashMap<Uuid, Entry>>,
}

impl SagaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new saga. A saga already present under this transaction id is left
    /// untouched — resubmitting the same command must not re-execute it (§9, R1).
    /// Returns `true` if the saga was newly inserted.
    pub fn put(&self, saga: Saga) -> bool {
        let mut sagas = self.sagas.write().unwrap();
        if sagas.contains_key(&saga.transaction_id) {
            return false;
        }
        sagas.insert(
            saga.transaction_id,
            Entry {
                tenant_id: saga.tenant_id.clone(),
                saga: Arc::new(Mutex::new(saga)),
            },
        );
        true
    }

    fn entry(&self, transaction_id: Uuid) -> SagaResult<Entry> {
        self.sagas
            .read()
            .unwrap()
            .get(&transaction_id)
            .cloned()
            .ok_or(SagaError::SagaNotFound(transaction_id))
    }

    pub async fn get_by_id(&self, transaction_id: Uuid) -> SagaResult<Saga> {
        let entry = self.entry(transaction_id)?;
        let saga = entry.saga.lock().await;
        Ok(saga.clone())
    }

    /// Tenant-scoped snapshot of every saga currently stored. Each saga is cloned
    /// under its own lock, so concurrent mutation of one saga cannot torn-read it,
    /// but the overall list is not a single atomic snapshot across sagas (§4.4).
    pub async fn get_all(&self, tenant_id: &str) -> Vec<Saga> {
        let entries: Vec<Entry> = self
            .sagas
            .read()
            .unwrap()
            .values()
            .filter(|e| e.tenant_id == tenant_id)
            .cloned()
            .collect();
        let mut result = Vec::with_capacity(entries.len());
        for entry in entries {
            result.push(entry.saga.lock().await.clone());
        }
        result
    }

    /// Applies `work` to the saga under its exclusive lock and returns the result.
    /// `work` is async and the per-saga lock is held for its entire duration —
    /// including any bus produce or HTTP call it makes. This is the concurrency
    /// model §5 calls for: the `Executing` transition and the dispatch that
    /// follows it must not be reordered relative to an incoming completion event
    /// for the same saga.
    pub async fn with_locked<F, Fut, T>(&self, transaction_id: Uuid, work: F) -> SagaResult<T>
    where
        F: FnOnce(&mut Saga) -> Fut,
        Fut: Future<Output = SagaResult<T>>,
    {
        let entry = self.entry(transaction_id)?;
        let mut guard: MutexGuard<'_, Saga> = entry.saga.lock().await;
        work(&mut guard).await
    }
}

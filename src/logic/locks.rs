use crate::model::Id;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Advisory locks keyed by validation scope (a proxy's matrix, a parent
/// assortment's sibling set). Mutations hold the scope lock across their
/// read-validate-write sequence; reads never take one.
#[derive(Debug, Default)]
pub struct ScopeLocks {
    locks: Mutex<HashMap<Id, Arc<AsyncMutex<()>>>>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a scope, creating it on first use. Entries are
    /// a few words each and live for the lifetime of the registry.
    pub async fn acquire(&self, scope: &Id) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(scope.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }
}

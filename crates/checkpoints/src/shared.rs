//! Registry handle shared by block-validation workers.

use std::sync::{Arc, Mutex, RwLock};

use crate::error::CheckpointError;
use crate::registry::Checkpoints;

#[derive(Debug, Default)]
struct Inner {
    current: RwLock<Arc<Checkpoints>>,
    writer: Mutex<()>,
}

/// Snapshot-swapping handle around [`Checkpoints`].
///
/// Readers clone the current `Arc` and query it without holding the lock.
/// Writers build a replacement off to the side and swap it in, so a reader
/// never sees a half-applied load.
#[derive(Clone, Debug, Default)]
pub struct SharedCheckpoints {
    inner: Arc<Inner>,
}

impl SharedCheckpoints {
    pub fn new(checkpoints: Checkpoints) -> Self {
        Self {
            inner: Arc::new(Inner {
                current: RwLock::new(Arc::new(checkpoints)),
                writer: Mutex::new(()),
            }),
        }
    }

    pub fn snapshot(&self) -> Arc<Checkpoints> {
        let guard = self
            .inner
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Applies `update` to a copy of the current registry and publishes it
    /// only on success.
    ///
    /// Writers are serialized so none loses another's additions. The update
    /// itself runs with no registry lock held; the write lock covers only the
    /// final swap, so readers never wait on a slow update.
    pub fn update<T, F>(&self, update: F) -> Result<T, CheckpointError>
    where
        F: FnOnce(&mut Checkpoints) -> Result<T, CheckpointError>,
    {
        let _writer = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut next = Checkpoints::clone(&self.snapshot());
        let value = update(&mut next)?;
        let mut guard = self
            .inner
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(next);
        Ok(value)
    }
}

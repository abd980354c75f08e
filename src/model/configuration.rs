//! Shareable configuration-model instance.

use crate::model::id::ConfigurationId;
use crate::model::tree::ConfigurationModel;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A live configuration model shared between the monitoring channel, the
/// reload notifier and any other readers.
///
/// Cloning is cheap and yields a handle to the same instance; the
/// [`ConfigurationId`] identifies that instance in the binder map.
#[derive(Debug, Clone)]
pub struct Configuration {
    id: ConfigurationId,
    model: Arc<RwLock<ConfigurationModel>>,
}

impl Configuration {
    pub fn new(model: ConfigurationModel) -> Self {
        Self {
            id: ConfigurationId::next(),
            model: Arc::new(RwLock::new(model)),
        }
    }

    pub fn id(&self) -> ConfigurationId {
        self.id
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ConfigurationModel> {
        self.model.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ConfigurationModel> {
        self.model.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live handles to this instance, binders included.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.model)
    }

    /// Swap in a freshly loaded model. Binders built against the old model
    /// stay stale until the reload signal is delivered.
    pub fn replace(&self, model: ConfigurationModel) -> ConfigurationModel {
        std::mem::replace(&mut *self.write(), model)
    }
}

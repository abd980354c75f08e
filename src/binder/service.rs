//! Process-level telemetry binding service.
//!
//! One [`TelemetryService`] is created at startup and shared by `Arc`. It maps
//! each configuration to its [`ValueBinder`] under a single lock, so a
//! `store_value_binding` call is atomic with respect to every other call.
//! A model reload drops every binder; the next call rebuilds codec and
//! pipeline snapshots from the current model.
//!
//! Reload signals arrive over a crossbeam channel:
//!
//! ```text
//! model loader ── ModelReloadNotifier::notify() ──► ReloadReceiver
//!                                                        │ listener thread
//!                                                        ▼
//!                                          TelemetryService::invalidate()
//! ```

use super::{BindingReport, ValueBinder};
use crate::codec::CodecSettings;
use crate::config::TelemetryConfig;
use crate::model::{Configuration, ConfigurationId, RawValue};
use crate::topology::RuntimeMappingProvider;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::thread::JoinHandle;

/// Pending reload signals beyond this are redundant.
const RELOAD_QUEUE_DEPTH: usize = 16;

/// Fire-and-forget "the model changed" signal. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ModelReloadNotifier {
    sender: Sender<()>,
}

impl ModelReloadNotifier {
    /// Signal a reload. Returns `false` once no listener is left.
    pub fn notify(&self) -> bool {
        match self.sender.try_send(()) {
            // A queued signal already covers this one.
            Ok(()) | Err(TrySendError::Full(())) => true,
            Err(TrySendError::Disconnected(())) => false,
        }
    }
}

/// Receiving side of the reload channel.
#[derive(Debug)]
pub struct ReloadReceiver {
    receiver: Receiver<()>,
}

impl ReloadReceiver {
    /// Drain queued signals without blocking; returns how many there were.
    pub fn drain(&self) -> usize {
        self.receiver.try_iter().count()
    }
}

/// Create a connected notifier/receiver pair.
pub fn reload_channel() -> (ModelReloadNotifier, ReloadReceiver) {
    let (sender, receiver) = bounded(RELOAD_QUEUE_DEPTH);
    (ModelReloadNotifier { sender }, ReloadReceiver { receiver })
}

/// Owns the configuration → binder map and everything needed to build a
/// binder.
pub struct TelemetryService {
    settings: CodecSettings,
    provider: Arc<dyn RuntimeMappingProvider>,
    binders: Mutex<HashMap<ConfigurationId, ValueBinder>>,
    generation: AtomicU64,
}

impl TelemetryService {
    pub fn new(config: &TelemetryConfig, provider: Arc<dyn RuntimeMappingProvider>) -> Self {
        Self::with_settings(CodecSettings::from_config(config), provider)
    }

    /// Use explicit codec settings, e.g. a registry with custom classifiers.
    pub fn with_settings(settings: CodecSettings, provider: Arc<dyn RuntimeMappingProvider>) -> Self {
        Self {
            settings,
            provider,
            binders: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Apply a batch of telemetry values into `configuration`.
    ///
    /// Entries are applied in order; a later entry for the same identifier
    /// replaces an earlier one. Per-entry failures are collected in the
    /// report.
    pub fn store_value_binding<I, S>(&self, configuration: &Configuration, bindings: I) -> BindingReport
    where
        I: IntoIterator<Item = (S, RawValue)>,
        S: Into<String>,
    {
        let mut binders = self.binders.lock().unwrap_or_else(PoisonError::into_inner);
        let binder = binders.entry(configuration.id()).or_insert_with(|| {
            let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::info!(
                "Building value binder for configuration {} (generation {})",
                configuration.id(),
                generation
            );
            ValueBinder::new(configuration.clone(), self.settings.clone(), Arc::clone(&self.provider))
        });

        for (identifier, raw) in bindings {
            binder.add(identifier, raw);
        }
        binder.commit()
    }

    /// Drop the binder of `configuration`, releasing its model reference.
    ///
    /// Binders otherwise live until the next reload, so a configuration
    /// discarded by its owner stays alive inside the service until then.
    pub fn forget(&self, configuration: &Configuration) -> bool {
        let removed = self
            .binders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&configuration.id())
            .is_some();
        if removed {
            tracing::debug!("Dropped value binder for configuration {}", configuration.id());
        }
        removed
    }

    /// Drop every binder.
    pub fn invalidate(&self) {
        let mut binders = self.binders.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = binders.len();
        binders.clear();
        tracing::info!("Model reloaded, dropped {} value binders", dropped);
    }

    /// Number of live binders.
    pub fn binder_count(&self) -> usize {
        self.binders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of binders built so far.
    pub fn binder_generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Invalidate on every signal from `reload` on a background thread.
    ///
    /// The thread ends once every notifier is dropped, or at the first signal
    /// after the service itself is gone.
    pub fn spawn_reload_listener(self: &Arc<Self>, reload: ReloadReceiver) -> std::io::Result<JoinHandle<()>> {
        let service: Weak<Self> = Arc::downgrade(self);
        std::thread::Builder::new()
            .name("telebind-reload".into())
            .spawn(move || {
                for () in reload.receiver.iter() {
                    let Some(service) = service.upgrade() else {
                        break;
                    };
                    // Signals queued behind this one are covered by the same invalidation.
                    let coalesced = reload.drain();
                    if coalesced > 0 {
                        tracing::debug!("Coalesced {} queued reload signals", coalesced);
                    }
                    service.invalidate();
                }
                tracing::debug!("Reload listener stopped");
            })
    }
}

impl std::fmt::Debug for TelemetryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryService")
            .field("binders", &self.binder_count())
            .field("generation", &self.binder_generation())
            .finish()
    }
}

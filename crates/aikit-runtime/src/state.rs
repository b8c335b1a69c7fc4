//! Single-slot runtime state shared by the lifecycle manager and the
//! session controller.
//!
//! The engine instance is process-wide mutable state. Every transition
//! decision is made under one lock, before any native call; the native
//! calls themselves run outside the lock while the slot is parked in a
//! transitional state (`Loading`/`Unloading`) or flagged as generating.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use aikit_core::domain::ModelHandle;
use aikit_core::error::BridgeError;
use aikit_core::ports::InferenceEngine;

/// Lifecycle state of the single model slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// No model occupies the slot.
    Unloaded,
    /// A load is in flight; the only exits are `Loaded` or back to
    /// `Unloaded` on failure.
    Loading,
    /// A model is loaded and ready for generation.
    Loaded(ModelHandle),
    /// An unload is in flight.
    Unloading,
}

#[derive(Debug)]
struct RuntimeState {
    slot: SlotState,
    generating: bool,
}

/// The engine and the lock that serializes access to it.
///
/// Held by both the lifecycle manager and the session controller; all
/// state-machine checks funnel through the transition methods here so the
/// mutual-exclusion invariants are enforced in one place, not best-effort.
pub struct EngineRuntime {
    engine: Arc<dyn InferenceEngine>,
    state: Mutex<RuntimeState>,
}

impl EngineRuntime {
    /// Wrap an engine in an unloaded runtime slot.
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            engine,
            state: Mutex::new(RuntimeState {
                slot: SlotState::Unloaded,
                generating: false,
            }),
        }
    }

    /// The engine behind the slot.
    pub fn engine(&self) -> &Arc<dyn InferenceEngine> {
        &self.engine
    }

    fn lock_state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the slot state.
    pub fn slot(&self) -> SlotState {
        self.lock_state().slot.clone()
    }

    /// Whether a model currently occupies the slot.
    pub fn is_loaded(&self) -> bool {
        matches!(self.lock_state().slot, SlotState::Loaded(_))
    }

    /// Whether a generation session is active.
    pub fn is_generating(&self) -> bool {
        self.lock_state().generating
    }

    /// Claim the slot for a load.
    pub(crate) fn begin_load(&self) -> Result<(), BridgeError> {
        let mut state = self.lock_state();
        match &state.slot {
            SlotState::Loading | SlotState::Unloading => Err(BridgeError::AlreadyLoading),
            SlotState::Loaded(handle) => Err(BridgeError::AlreadyLoaded {
                path: handle.path.display().to_string(),
            }),
            SlotState::Unloaded => {
                state.slot = SlotState::Loading;
                Ok(())
            }
        }
    }

    /// Commit the load outcome: `Some(handle)` on native success, `None`
    /// to roll back to `Unloaded`.
    pub(crate) fn finish_load(&self, handle: Option<ModelHandle>) {
        let mut state = self.lock_state();
        state.slot = handle.map_or(SlotState::Unloaded, SlotState::Loaded);
    }

    /// Claim the slot for an unload.
    ///
    /// Returns `Ok(false)` for the no-op case (already unloaded).
    pub(crate) fn begin_unload(&self) -> Result<bool, BridgeError> {
        let mut state = self.lock_state();
        if state.generating {
            return Err(BridgeError::GenerationInProgress);
        }
        match state.slot {
            SlotState::Unloaded => Ok(false),
            SlotState::Loading | SlotState::Unloading => Err(BridgeError::AlreadyLoading),
            SlotState::Loaded(_) => {
                state.slot = SlotState::Unloading;
                Ok(true)
            }
        }
    }

    /// Commit the unload: the slot is empty again.
    pub(crate) fn finish_unload(&self) {
        self.lock_state().slot = SlotState::Unloaded;
    }

    /// Claim the single generation session.
    pub(crate) fn begin_generation(&self) -> Result<(), BridgeError> {
        let mut state = self.lock_state();
        if !matches!(state.slot, SlotState::Loaded(_)) {
            return Err(BridgeError::NoModelLoaded);
        }
        if state.generating {
            return Err(BridgeError::SessionBusy);
        }
        state.generating = true;
        Ok(())
    }

    /// Release the generation session.
    pub(crate) fn end_generation(&self) {
        self.lock_state().generating = false;
    }
}

impl std::fmt::Debug for EngineRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRuntime")
            .field("state", &self.lock_state())
            .finish_non_exhaustive()
    }
}

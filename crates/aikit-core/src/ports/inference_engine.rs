//! Native inference engine port.
//!
//! Wraps the opaque engine's four primitives (load, generate, stop, unload)
//! behind a safe synchronous interface with explicit error signaling. The
//! engine instance is process-wide, single-instance, mutable state; callers
//! must serialize load/generate/unload relative to each other; `stop` is
//! the one primitive designed to be invoked out-of-band while a generation
//! runs.

use thiserror::Error;

use crate::domain::{LoadRequest, SamplingParams};

/// Failure reported by the engine adapter.
///
/// Raw engine errors are captured here and translated into caller-facing
/// kinds at the service boundary and never escape as panics or opaque
/// foreign exceptions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine could not load the model file.
    #[error("model load failed: {0}")]
    Load(String),

    /// The engine failed while producing tokens.
    #[error("generation failed: {0}")]
    Generation(String),
}

/// Synchronous interface over the native inference engine.
///
/// `generate` invokes `on_token` once per produced token, in production
/// order, before sampling the next token: the callback is the streaming
/// side channel, the return value is the full concatenated text.
///
/// Implementations are expected to be blocking; services run these calls on
/// a dedicated blocking execution context so the control thread is never
/// held by token production.
pub trait InferenceEngine: Send + Sync {
    /// Load a model into the engine's single slot.
    fn load(&self, request: &LoadRequest) -> Result<(), EngineError>;

    /// Run one generation, streaming tokens through `on_token`.
    ///
    /// Returns the full concatenated text. A stop signal raised through
    /// [`InferenceEngine::stop`] must be honored within one token step, in
    /// which case the text produced so far is returned.
    fn generate(
        &self,
        prompt: &str,
        params: &SamplingParams,
        on_token: &mut dyn FnMut(&str),
    ) -> Result<String, EngineError>;

    /// Signal the in-flight generation (if any) to stop. Idempotent;
    /// callable from any thread at any time.
    fn stop(&self);

    /// Release the loaded model. No-op when nothing is loaded.
    fn unload(&self);
}

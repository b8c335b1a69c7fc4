//! Blocking generation worker.
//!
//! Runs one native generate call on the blocking pool, forwarding each
//! token to the listener as it arrives and accumulating the partial text so
//! a cancellation can resolve with everything produced so far.

use aikit_core::domain::{GenerationOutcome, GenerationRequest};
use aikit_core::error::BridgeError;
use aikit_core::ports::{GenerationListener, InferenceEngine};
use tokio_util::sync::CancellationToken;

/// Drive the engine to completion, cancellation, or failure.
///
/// Tokens are delivered to the listener exactly once, in production order,
/// synchronously from the engine's callback; the engine does not sample
/// the next token until the listener returns.
pub(crate) fn run_generation(
    engine: &dyn InferenceEngine,
    request: &GenerationRequest,
    cancel: &CancellationToken,
    listener: &dyn GenerationListener,
) -> GenerationOutcome {
    let mut accumulated = String::new();
    let mut on_token = |token: &str| {
        accumulated.push_str(token);
        listener.on_token(token);
    };

    let result = engine.generate(&request.prompt, &request.params, &mut on_token);

    // Cancellation wins over whatever the engine returned: an engine cut
    // short by stop may report either the partial text or an error, and the
    // caller asked for neither.
    if cancel.is_cancelled() {
        return GenerationOutcome::Cancelled {
            partial: accumulated,
        };
    }

    match result {
        Ok(text) => GenerationOutcome::Completed { text },
        Err(e) => GenerationOutcome::Failed {
            error: BridgeError::generation_failure(e.to_string()),
        },
    }
}

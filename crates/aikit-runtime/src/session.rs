//! Generation session controller.
//!
//! Runs one generation at a time on a dedicated blocking execution context,
//! streams tokens to the registered listener as they arrive, and supports
//! out-of-band cancellation that the engine observes within one token step.
//! Concurrent `generate` calls are rejected, never queued.

use std::sync::{Arc, Mutex, PoisonError};

use aikit_core::domain::{GenerationOutcome, GenerationRequest};
use aikit_core::error::{BridgeError, BridgeResult};
use aikit_core::ports::GenerationListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::state::EngineRuntime;
use crate::worker;

/// Handle to one accepted generation.
///
/// `generate` returns as soon as the session is accepted; the ticket is the
/// resolution channel. Success, failure, and cancellation all arrive here;
/// a background failure is never silently dropped.
#[derive(Debug)]
pub struct GenerationTicket {
    outcome: oneshot::Receiver<GenerationOutcome>,
}

impl GenerationTicket {
    /// Wait for the session's terminal outcome.
    pub async fn wait(self) -> GenerationOutcome {
        self.outcome.await.unwrap_or_else(|_| GenerationOutcome::Failed {
            error: BridgeError::generation_failure("session ended without resolution"),
        })
    }
}

struct ActiveSession {
    cancel: CancellationToken,
}

/// Accepts, supervises, and cancels generation sessions.
pub struct GenerationController {
    runtime: Arc<EngineRuntime>,
    listener: Arc<dyn GenerationListener>,
    active: Arc<Mutex<Option<ActiveSession>>>,
}

impl GenerationController {
    /// Create a controller over a shared runtime slot.
    ///
    /// The listener is registered up front; there is no way to attach one
    /// to a session already in flight.
    pub fn new(runtime: Arc<EngineRuntime>, listener: Arc<dyn GenerationListener>) -> Self {
        Self {
            runtime,
            listener,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Start a generation session.
    ///
    /// Fails with `InvalidInput` for an empty prompt or non-finite
    /// parameters, `NoModelLoaded` unless a model occupies the slot, and
    /// `SessionBusy` while another session is active, all before the
    /// engine is touched. Returns immediately on acceptance; tokens flow to
    /// the listener and the outcome resolves through the ticket.
    ///
    /// Must be called from within a tokio runtime.
    pub fn generate(&self, request: GenerationRequest) -> BridgeResult<GenerationTicket> {
        request.validate()?;
        self.runtime.begin_generation()?;

        tracing::info!(
            prompt_len = request.prompt.len(),
            n_predict = request.params.n_predict,
            "generation session accepted"
        );

        let cancel = CancellationToken::new();
        *self.lock_active() = Some(ActiveSession {
            cancel: cancel.clone(),
        });

        let (done_tx, done_rx) = oneshot::channel();
        let runtime = Arc::clone(&self.runtime);
        let listener = Arc::clone(&self.listener);
        let active = Arc::clone(&self.active);

        tokio::spawn(async move {
            let engine = Arc::clone(runtime.engine());
            let worker_listener = Arc::clone(&listener);
            let worker_cancel = cancel.clone();
            let joined = tokio::task::spawn_blocking(move || {
                worker::run_generation(
                    engine.as_ref(),
                    &request,
                    &worker_cancel,
                    worker_listener.as_ref(),
                )
            })
            .await;

            let outcome = joined.unwrap_or_else(|join_error| GenerationOutcome::Failed {
                error: BridgeError::generation_failure(format!(
                    "generation task aborted: {join_error}"
                )),
            });

            // Release the single-session slot only after the active entry
            // is gone, so a racing `generate` cannot be cancelled by a
            // stale entry.
            active
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            runtime.end_generation();

            match &outcome {
                GenerationOutcome::Completed { text } => {
                    tracing::info!(chars = text.len(), "generation completed");
                }
                GenerationOutcome::Cancelled { partial } => {
                    tracing::info!(chars = partial.len(), "generation cancelled");
                }
                GenerationOutcome::Failed { error } => {
                    tracing::warn!(error = %error, "generation failed");
                }
            }

            listener.on_complete(&outcome);
            let _ = done_tx.send(outcome);
        });

        Ok(GenerationTicket { outcome: done_rx })
    }

    /// Cancel the active session, if any.
    ///
    /// Unconditional no-op success when idle. When active, trips the
    /// session's cancellation token and signals the engine's stop
    /// primitive; the engine honors it within one token step and the
    /// in-flight session resolves `Cancelled` with its partial text.
    pub fn cancel(&self) {
        let guard = self.lock_active();
        if let Some(session) = guard.as_ref() {
            session.cancel.cancel();
            self.runtime.engine().stop();
            tracing::info!("generation cancel requested");
        }
    }

    /// Whether a session is currently active.
    pub fn is_busy(&self) -> bool {
        self.runtime.is_generating()
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

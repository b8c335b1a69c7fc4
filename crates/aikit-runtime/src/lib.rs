//! Model lifecycle and generation orchestration for aikit.
//!
//! This crate enforces the single-slot invariants over an injected
//! [`aikit_core::ports::InferenceEngine`]: at most one loaded model, at
//! most one generation session, and never an unload while a session is
//! active. The lifecycle manager and the session controller share one
//! [`EngineRuntime`] so every transition decision goes through the same
//! lock.
//!
//! ```ignore
//! let runtime = Arc::new(EngineRuntime::new(engine));
//! let lifecycle = ModelLifecycle::new(Arc::clone(&runtime), store);
//! let controller = GenerationController::new(runtime, listener);
//!
//! lifecycle.load(LoadRequest::new(path)).await?;
//! let ticket = controller.generate(GenerationRequest::new("hello"))?;
//! let outcome = ticket.wait().await;
//! ```

#![deny(unused_crate_dependencies)]

mod lifecycle;
mod session;
mod state;
mod worker;

pub use lifecycle::ModelLifecycle;
pub use session::{GenerationController, GenerationTicket};
pub use state::{EngineRuntime, SlotState};

//! Token listener seam between the session controller and its consumer.
//!
//! The controller publishes each token exactly once, in production order,
//! before the next token is requested from the native layer, then publishes
//! the terminal outcome. Consumers register a listener before `generate` is
//! issued; there is no way to attach mid-stream.

use tokio::sync::mpsc;

use crate::domain::GenerationOutcome;

/// Receives the token stream and terminal outcome of generation sessions.
///
/// Callbacks run on the generation execution context; implementations must
/// not block for long or the one-token-step cancellation bound degrades.
pub trait GenerationListener: Send + Sync {
    /// One token, in production order.
    fn on_token(&self, token: &str);

    /// Terminal resolution of the session.
    fn on_complete(&self, outcome: &GenerationOutcome);
}

/// Listener that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl GenerationListener for NoopListener {
    fn on_token(&self, _token: &str) {}
    fn on_complete(&self, _outcome: &GenerationOutcome) {}
}

/// Event forwarded by [`ChannelListener`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationEvent {
    /// One produced token.
    Token(String),
    /// Terminal resolution.
    Finished(GenerationOutcome),
}

/// Listener that forwards events into an unbounded channel.
///
/// The receiving half yields a lazy, in-order, finite sequence: tokens
/// followed by exactly one `Finished` event, after which the channel
/// closes.
#[derive(Debug)]
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<GenerationEvent>,
}

impl ChannelListener {
    /// Create the listener and the receiving half of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<GenerationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl GenerationListener for ChannelListener {
    fn on_token(&self, token: &str) {
        // A dropped receiver just means nobody is watching anymore.
        let _ = self.tx.send(GenerationEvent::Token(token.to_string()));
    }

    fn on_complete(&self, outcome: &GenerationOutcome) {
        let _ = self.tx.send(GenerationEvent::Finished(outcome.clone()));
    }
}

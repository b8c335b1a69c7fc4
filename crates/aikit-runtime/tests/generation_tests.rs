//! End-to-end behavior of the lifecycle manager and session controller
//! against a paced in-process engine.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use aikit_core::domain::{GenerationOutcome, GenerationRequest, LoadRequest, SamplingParams};
use aikit_core::error::BridgeError;
use aikit_core::ports::{
    ChannelListener, EngineError, GenerationEvent, GenerationListener, InferenceEngine,
    KeyValueStore, MemoryKeyValueStore,
};
use aikit_runtime::{EngineRuntime, GenerationController, ModelLifecycle, SlotState};
use tokio::sync::mpsc::UnboundedReceiver;

/// Engine that emits `n_predict` tokens at a fixed pace and honors stop
/// between tokens, like a real sampler loop.
struct PacedEngine {
    stop: AtomicBool,
    load_delay: Duration,
    token_delay: Duration,
    fail_at: Option<usize>,
    generate_calls: AtomicU32,
}

impl PacedEngine {
    fn new(token_delay: Duration) -> Self {
        Self {
            stop: AtomicBool::new(false),
            load_delay: Duration::ZERO,
            token_delay,
            fail_at: None,
            generate_calls: AtomicU32::new(0),
        }
    }

    fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl InferenceEngine for PacedEngine {
    fn load(&self, _request: &LoadRequest) -> Result<(), EngineError> {
        if !self.load_delay.is_zero() {
            std::thread::sleep(self.load_delay);
        }
        Ok(())
    }

    fn generate(
        &self,
        _prompt: &str,
        params: &SamplingParams,
        on_token: &mut dyn FnMut(&str),
    ) -> Result<String, EngineError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.stop.store(false, Ordering::SeqCst);
        let mut text = String::new();
        for i in 0..params.n_predict as usize {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }
            if self.fail_at == Some(i) {
                return Err(EngineError::Generation("decode failure".to_string()));
            }
            let token = format!("t{i} ");
            on_token(&token);
            text.push_str(&token);
            if !self.token_delay.is_zero() {
                std::thread::sleep(self.token_delay);
            }
        }
        Ok(text)
    }

    fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn unload(&self) {}
}

struct Fixture {
    lifecycle: ModelLifecycle,
    controller: GenerationController,
    engine: Arc<PacedEngine>,
    events: UnboundedReceiver<GenerationEvent>,
    _dir: tempfile::TempDir,
    model_path: PathBuf,
}

fn fixture(engine: PacedEngine) -> Fixture {
    let engine = Arc::new(engine);
    let runtime = Arc::new(EngineRuntime::new(
        Arc::clone(&engine) as Arc<dyn InferenceEngine>
    ));
    let store = Arc::new(MemoryKeyValueStore::new());
    let (listener, events) = ChannelListener::new();

    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("weights.gguf");
    let mut f = std::fs::File::create(&model_path).unwrap();
    f.write_all(b"GGUF").unwrap();

    Fixture {
        lifecycle: ModelLifecycle::new(Arc::clone(&runtime), store as Arc<dyn KeyValueStore>),
        controller: GenerationController::new(
            runtime,
            Arc::new(listener) as Arc<dyn GenerationListener>,
        ),
        engine,
        events,
        _dir: dir,
        model_path,
    }
}

/// Drain events until the session finishes, returning (tokens, outcome).
async fn drain_session(events: &mut UnboundedReceiver<GenerationEvent>) -> (Vec<String>, GenerationOutcome) {
    let mut tokens = Vec::new();
    loop {
        match events.recv().await.expect("listener channel closed early") {
            GenerationEvent::Token(token) => tokens.push(token),
            GenerationEvent::Finished(outcome) => return (tokens, outcome),
        }
    }
}

#[tokio::test]
async fn generate_without_model_never_touches_engine() {
    let fx = fixture(PacedEngine::new(Duration::ZERO));
    let err = fx
        .controller
        .generate(GenerationRequest::new("hello"))
        .unwrap_err();
    assert_eq!(err, BridgeError::NoModelLoaded);
    assert_eq!(fx.engine.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn tokens_stream_in_order_and_resolve_with_full_text() {
    let mut fx = fixture(PacedEngine::new(Duration::ZERO));
    fx.lifecycle
        .load(LoadRequest::new(&fx.model_path))
        .await
        .unwrap();

    let request = GenerationRequest::new("hello").with_n_predict(8);
    let ticket = fx.controller.generate(request).unwrap();
    let outcome = ticket.wait().await;

    let (tokens, listener_outcome) = drain_session(&mut fx.events).await;
    assert_eq!(outcome, listener_outcome);

    // Exactly-once, in production order.
    assert_eq!(tokens.len(), 8);
    for (i, token) in tokens.iter().enumerate() {
        assert_eq!(token, &format!("t{i} "));
    }

    match outcome {
        GenerationOutcome::Completed { text } => assert_eq!(text, tokens.concat()),
        other => panic!("expected completion, got {other:?}"),
    }
    assert!(!fx.controller.is_busy());
}

#[tokio::test]
async fn concurrent_generate_is_rejected_not_queued() {
    let mut fx = fixture(PacedEngine::new(Duration::from_millis(2)));
    fx.lifecycle
        .load(LoadRequest::new(&fx.model_path))
        .await
        .unwrap();

    let ticket = fx
        .controller
        .generate(GenerationRequest::new("a").with_n_predict(200))
        .unwrap();

    // Wait until the session is demonstrably producing.
    assert!(matches!(
        fx.events.recv().await,
        Some(GenerationEvent::Token(_))
    ));

    let err = fx
        .controller
        .generate(GenerationRequest::new("b"))
        .unwrap_err();
    assert_eq!(err, BridgeError::SessionBusy);
    // Only the first request reached the engine.
    assert_eq!(fx.engine.generate_calls.load(Ordering::SeqCst), 1);

    fx.controller.cancel();
    ticket.wait().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn unload_rejected_for_every_interleaving_with_a_session() {
    let mut fx = fixture(PacedEngine::new(Duration::from_millis(1)));
    fx.lifecycle
        .load(LoadRequest::new(&fx.model_path))
        .await
        .unwrap();

    for _ in 0..12 {
        let ticket = fx
            .controller
            .generate(GenerationRequest::new("go").with_n_predict(500))
            .unwrap();

        // The session is active from acceptance to resolution; unload must
        // lose every race in between.
        let err = fx.lifecycle.unload().await.unwrap_err();
        assert_eq!(err, BridgeError::GenerationInProgress);

        fx.controller.cancel();
        let outcome = ticket.wait().await;
        assert!(!matches!(outcome, GenerationOutcome::Failed { .. }));
        let (_tokens, _outcome) = drain_session(&mut fx.events).await;

        // With the session resolved, unload works, and the model can come
        // straight back for the next round.
        fx.lifecycle.unload().await.unwrap();
        fx.lifecycle
            .load(LoadRequest::new(&fx.model_path))
            .await
            .unwrap();
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_stops_within_a_bounded_number_of_tokens() {
    let mut fx = fixture(PacedEngine::new(Duration::from_millis(1)));
    fx.lifecycle
        .load(LoadRequest::new(&fx.model_path))
        .await
        .unwrap();

    let ticket = fx
        .controller
        .generate(GenerationRequest::new("hello").with_n_predict(500))
        .unwrap();

    // Let at least one token through, then cancel.
    assert!(matches!(
        fx.events.recv().await,
        Some(GenerationEvent::Token(_))
    ));
    fx.controller.cancel();

    let outcome = ticket.wait().await;
    let (tokens, listener_outcome) = drain_session(&mut fx.events).await;
    assert_eq!(outcome, listener_outcome);

    match &outcome {
        GenerationOutcome::Cancelled { partial } => {
            // +1 for the token consumed before draining.
            assert!(tokens.len() + 1 < 500, "cancel was not honored promptly");
            assert_eq!(*partial, format!("t0 {}", tokens.concat()));
        }
        other => panic!("expected cancellation, got {other:?}"),
    }

    // The session reached its terminal state and the slot is free again.
    assert!(!fx.controller.is_busy());
    fx.lifecycle.unload().await.unwrap();
}

#[tokio::test]
async fn cancel_when_idle_is_a_noop() {
    let fx = fixture(PacedEngine::new(Duration::ZERO));
    fx.controller.cancel();
    assert!(!fx.controller.is_busy());
}

#[tokio::test]
async fn mid_stream_failure_resolves_and_leaves_model_usable() {
    let mut fx = fixture(PacedEngine::new(Duration::ZERO).failing_at(3));
    fx.lifecycle
        .load(LoadRequest::new(&fx.model_path))
        .await
        .unwrap();

    let ticket = fx
        .controller
        .generate(GenerationRequest::new("hello").with_n_predict(10))
        .unwrap();
    let outcome = ticket.wait().await;

    let (tokens, listener_outcome) = drain_session(&mut fx.events).await;
    assert_eq!(outcome, listener_outcome);
    assert_eq!(tokens.len(), 3);
    assert!(matches!(
        outcome,
        GenerationOutcome::Failed {
            error: BridgeError::GenerationFailure { .. }
        }
    ));

    // The failure must not corrupt the slot: still loaded, still unloadable.
    assert!(fx.lifecycle.is_loaded());
    fx.lifecycle.unload().await.unwrap();
    assert_eq!(fx.lifecycle.slot(), SlotState::Unloaded);
}

#[tokio::test]
async fn empty_prompt_rejected_before_session_claims_slot() {
    let fx = fixture(PacedEngine::new(Duration::ZERO));
    let err = fx
        .controller
        .generate(GenerationRequest::new(""))
        .unwrap_err();
    assert!(matches!(err, BridgeError::InvalidInput { .. }));
    assert!(!fx.controller.is_busy());
}

#[tokio::test(flavor = "multi_thread")]
async fn load_while_loading_is_rejected() {
    let fx = fixture(PacedEngine::new(Duration::ZERO).with_load_delay(Duration::from_millis(150)));
    let lifecycle = Arc::new(fx.lifecycle);
    let path = fx.model_path.clone();

    let slow = {
        let lifecycle = Arc::clone(&lifecycle);
        let path = path.clone();
        tokio::spawn(async move { lifecycle.load(LoadRequest::new(path)).await })
    };

    // Give the first load time to claim the slot.
    tokio::time::sleep(Duration::from_millis(30)).await;
    let err = lifecycle.load(LoadRequest::new(&path)).await.unwrap_err();
    assert_eq!(err, BridgeError::AlreadyLoading);

    slow.await.unwrap().unwrap();
    assert!(lifecycle.is_loaded());
}

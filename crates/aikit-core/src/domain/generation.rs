//! Generation request, sampling parameters, and outcome types.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Sampling parameters for one generation.
///
/// Each field has a documented default applied when the caller omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Maximum tokens to predict.
    pub n_predict: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Top-K sampling limit.
    pub top_k: i32,
    /// Nucleus sampling threshold.
    pub top_p: f32,
    /// Repetition penalty.
    pub repeat_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            n_predict: 512,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.9,
            repeat_penalty: 1.1,
        }
    }
}

/// A prompt plus sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The prompt to complete.
    pub prompt: String,
    /// Sampling parameters.
    pub params: SamplingParams,
}

impl GenerationRequest {
    /// Create a request with default sampling parameters.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            params: SamplingParams::default(),
        }
    }

    /// Set the maximum tokens to predict.
    #[must_use]
    pub const fn with_n_predict(mut self, n_predict: u32) -> Self {
        self.params.n_predict = n_predict;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.params.temperature = temperature;
        self
    }

    /// Replace all sampling parameters.
    #[must_use]
    pub fn with_params(mut self, params: SamplingParams) -> Self {
        self.params = params;
        self
    }

    /// Validate the request before it reaches the native layer.
    ///
    /// The prompt must be non-empty; all numeric parameters must be finite
    /// and the counts non-negative.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.prompt.is_empty() {
            return Err(BridgeError::invalid_input("prompt must not be empty"));
        }
        let SamplingParams {
            temperature,
            top_k,
            top_p,
            repeat_penalty,
            ..
        } = self.params;
        if !temperature.is_finite() || !top_p.is_finite() || !repeat_penalty.is_finite() {
            return Err(BridgeError::invalid_input(
                "sampling parameters must be finite",
            ));
        }
        if top_k < 0 {
            return Err(BridgeError::invalid_input("top_k must be non-negative"));
        }
        Ok(())
    }
}

/// Terminal resolution of one generation session.
///
/// Success, failure, and cancellation all resolve through this single
/// channel; a background failure is never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationOutcome {
    /// The engine ran to completion (end of generation or token budget).
    Completed {
        /// Full concatenated text.
        text: String,
    },
    /// The caller cancelled; the engine stopped within one token step.
    Cancelled {
        /// Text accumulated before the engine honored stop.
        partial: String,
    },
    /// The engine reported a failure mid-stream.
    Failed {
        /// The translated failure.
        error: BridgeError,
    },
}

impl GenerationOutcome {
    /// The produced text, full or partial. `None` for failures.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Completed { text } | Self::Cancelled { partial: text } => Some(text),
            Self::Failed { .. } => None,
        }
    }

    /// Whether the session was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether the session completed normally.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

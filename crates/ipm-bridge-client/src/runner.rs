// crates/ipm-bridge-client/src/runner.rs
// ============================================================================
// Module: Model Runner
// Description: Composes model input and invokes the execution endpoint.
// Purpose: Tie synthesis, composition, and transport into one model run.
// Dependencies: ipm-bridge-core, ipm-bridge-synth, serde_json, url
// ============================================================================

//! ## Overview
//! Running a model is one POST: the composed input document goes to the
//! model's execution endpoint and the response comes back unmodified, in
//! whatever shape the model vendor chose. [`ModelRunner::run`] performs
//! the full sequence (synthesize the skeleton, compose it with caller
//! data, invoke); [`ModelRunner::invoke`] is the escape hatch for callers
//! who built the input document themselves.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ipm_bridge_core::ModelDescriptor;
use ipm_bridge_synth::ComposeError;
use ipm_bridge_synth::ComposeInputs;
use ipm_bridge_synth::compose;
use ipm_bridge_synth::synthesize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::transport::Transport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Why a model run failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    /// The model's execution endpoint does not parse as a URL.
    #[error("model `{model_id}` endpoint `{url}` is invalid: {detail}")]
    InvalidEndpoint {
        /// The model in question.
        model_id: String,
        /// The endpoint text from the descriptor.
        url: String,
        /// Parse failure detail.
        detail: String,
    },
    /// The input document could not be composed.
    #[error(transparent)]
    Compose(#[from] ComposeError),
    /// The underlying HTTP exchange failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes DSS models over a [`Transport`].
#[derive(Debug, Clone)]
pub struct ModelRunner<T> {
    /// Transport used for execution calls.
    transport: T,
}

impl<T: Transport> ModelRunner<T> {
    /// Creates a runner over the given transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Synthesizes and composes the model's input from caller data, then
    /// invokes the model. Degraded schema branches do not block the run;
    /// callers who care inspect the synthesis themselves beforehand.
    ///
    /// # Errors
    /// Returns [`RunError::Compose`] when required data is missing or
    /// incompatible, and [`RunError::Transport`] or
    /// [`RunError::InvalidEndpoint`] for invocation failures.
    pub fn run(
        &self,
        model: &ModelDescriptor,
        inputs: &ComposeInputs<'_>,
    ) -> Result<Value, RunError> {
        let synthesis = synthesize(&model.execution.input_schema);
        let document = compose(model, &synthesis, inputs)?;
        self.invoke(model, &document)
    }

    /// POSTs a prepared input document to the model's execution endpoint
    /// and returns the response body unmodified.
    ///
    /// # Errors
    /// Returns [`RunError::InvalidEndpoint`] when the descriptor's
    /// endpoint does not parse, and [`RunError::Transport`] when the
    /// exchange fails.
    pub fn invoke(&self, model: &ModelDescriptor, input: &Value) -> Result<Value, RunError> {
        let url =
            Url::parse(&model.execution.endpoint).map_err(|err| RunError::InvalidEndpoint {
                model_id: model.id.clone(),
                url: model.execution.endpoint.clone(),
                detail: err.to_string(),
            })?;
        Ok(self.transport.post_json(&url, input)?)
    }
}

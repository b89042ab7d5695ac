/*!
 * Provider implementations and the translation caller contract.
 *
 * This module contains:
 * - `Provider`: the low-level request/response trait implemented by LLM clients
 * - `TranslationCaller`: the capability the orchestrator depends on
 * - `SharedCaller`: a build-once handle for the process-wide caller
 * - `openai`: OpenAI chat completion client with structured output
 * - `mock`: in-memory callers for tests
 */

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::errors::{ProviderError, TranslationError};

/// Common trait for all LLM providers
///
/// This trait defines the interface that provider clients follow,
/// allowing them to be used interchangeably by the callers built on top.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    ///
    /// # Arguments
    /// * `request` - The request to complete
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response from the provider or an error
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// One translated line, tagged with the transcript position it belongs to
///
/// The index is signed because it comes straight from the model; values
/// that do not name a dispatched entry are reported as ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTranslation {
    /// Position of the entry in the transcript
    pub index: i64,

    /// Translated sentence
    pub sentence: String,
}

impl IndexedTranslation {
    pub fn new(index: i64, sentence: impl Into<String>) -> Self {
        Self {
            index,
            sentence: sentence.into(),
        }
    }
}

/// Capability that translates one prompt into indexed sentences
///
/// Implementations own everything vendor specific: model choice, schema
/// negotiation, authentication and retries. The order of the returned
/// pairs carries no meaning.
#[async_trait]
pub trait TranslationCaller: Send + Sync {
    /// Translate every tagged line of `prompt`
    async fn request_translation(&self, prompt: &str) -> Result<Vec<IndexedTranslation>, ProviderError>;
}

#[async_trait]
impl<C: TranslationCaller + ?Sized> TranslationCaller for Arc<C> {
    async fn request_translation(&self, prompt: &str) -> Result<Vec<IndexedTranslation>, ProviderError> {
        (**self).request_translation(prompt).await
    }
}

#[async_trait]
impl<C: TranslationCaller + ?Sized> TranslationCaller for Box<C> {
    async fn request_translation(&self, prompt: &str) -> Result<Vec<IndexedTranslation>, ProviderError> {
        (**self).request_translation(prompt).await
    }
}

/// Build-once handle to a caller shared across requests
///
/// The first thread to call [`SharedCaller::get_or_init`] runs the
/// initializer; concurrent callers block until it finishes and then share
/// the same `Arc`. The first outcome is kept: once initialization has
/// failed, every later call returns the same
/// `TranslationError::CallerInitialization` without running `init` again.
pub struct SharedCaller<C> {
    cell: OnceCell<Result<Arc<C>, String>>,
}

impl<C> Default for SharedCaller<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SharedCaller<C> {
    /// Create an empty handle
    pub const fn new() -> Self {
        Self { cell: OnceCell::new() }
    }

    /// Return the caller, building it with `init` on first use
    pub fn get_or_init<F>(&self, init: F) -> Result<Arc<C>, TranslationError>
    where
        F: FnOnce() -> Result<C, TranslationError>,
    {
        let outcome = self.cell.get_or_init(|| {
            init().map(Arc::new).map_err(|e| match e {
                TranslationError::CallerInitialization(message) => message,
                other => other.to_string(),
            })
        });

        match outcome {
            Ok(caller) => Ok(Arc::clone(caller)),
            Err(message) => Err(TranslationError::CallerInitialization(message.clone())),
        }
    }

    /// Return the caller if it has been built successfully
    pub fn get(&self) -> Option<Arc<C>> {
        self.cell.get().and_then(|outcome| outcome.as_ref().ok().cloned())
    }

    /// Whether initialization was attempted and failed
    pub fn is_failed(&self) -> bool {
        matches!(self.cell.get(), Some(Err(_)))
    }
}

pub mod mock;
pub mod openai;

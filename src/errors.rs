/*!
 * Error types for the transcript translator.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The API answered without any completion choice
    #[error("API returned an empty response")]
    EmptyResponse,
}

/// Errors raised while ingesting a transcript
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// A required entry field is empty
    #[error("entry {index}: field '{field}' must not be empty")]
    EmptyField {
        /// Position of the offending entry
        index: usize,
        /// Name of the empty field
        field: &'static str,
    },

    /// The transcript JSON could not be decoded
    #[error("Failed to parse transcript: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// One prompt of the batch could not be translated
    #[error("failed to translate chunk {chunk}/{total}: {source}")]
    ChunkFailed {
        /// 1-based position of the failing prompt
        chunk: usize,
        /// Number of prompts in the batch
        total: usize,
        /// Underlying provider failure
        #[source]
        source: ProviderError,
    },

    /// The shared API client could not be constructed
    #[error("translation client initialization failed: {0}")]
    CallerInitialization(String),
}

impl TranslationError {
    /// Whether this error belongs to process startup rather than to one request
    pub fn is_initialization(&self) -> bool {
        matches!(self, Self::CallerInitialization(_))
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid transcript input
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

/*!
 * # transcript-translator
 *
 * Translates the Arabic lines of a speaker-attributed transcript to English
 * with an LLM, leaving every other line and the original order untouched.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `transcript`: Entry and Transcript data model, JSON ingestion
 * - `detection`: Arabic script detection
 * - `translation`: Prompt batching and orchestration:
 *   - `translation::batch`: Size-bounded, index-tagged prompts
 *   - `translation::orchestrator`: Sequential dispatch and write-back
 * - `providers`: The `TranslationCaller` capability and its implementations:
 *   - `providers::openai`: OpenAI chat completions with structured output
 *   - `providers::mock`: In-memory callers for tests
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod detection;
pub mod errors;
pub mod providers;
pub mod transcript;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use detection::contains_target_script;
pub use errors::{AppError, ProviderError, TranscriptError, TranslationError};
pub use providers::{IndexedTranslation, SharedCaller, TranslationCaller};
pub use transcript::{Entry, Transcript};
pub use translation::{TranslationOutcome, TranslationReport, Translator};

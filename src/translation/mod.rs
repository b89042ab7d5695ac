/*!
 * Transcript translation.
 *
 * - `batch`: splitting Arabic entries into size-bounded, index-tagged prompts
 * - `orchestrator`: sequential dispatch and all-or-nothing write-back
 */

// Re-export main types for easier usage
pub use self::batch::{build_prompts, PromptBatch, PromptBatcher, DEFAULT_PROMPT_BUDGET, PROMPT_HEADER};
pub use self::orchestrator::{TranslationOutcome, TranslationReport, Translator};

// Submodules
pub mod batch;
pub mod orchestrator;

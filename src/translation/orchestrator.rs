/*!
 * Translation orchestration.
 *
 * The `Translator` batches a transcript into prompts, sends them to its
 * caller one at a time and, once every prompt has been answered, writes the
 * translated sentences back by index. Nothing is written if any prompt
 * fails.
 */

use log::{debug, error, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use crate::errors::TranslationError;
use crate::providers::TranslationCaller;
use crate::transcript::Transcript;

use super::batch::{PromptBatch, PromptBatcher, DEFAULT_PROMPT_BUDGET};

/// Summary of a completed translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    /// Number of prompts dispatched
    pub chunks: usize,

    /// Number of tagged lines across all prompts
    pub lines: usize,

    /// Number of sentences rewritten
    pub applied: usize,

    /// Indices returned by the caller that were never dispatched,
    /// including negative ones
    pub ignored: Vec<i64>,

    /// Dispatched indices the caller returned nothing for
    pub missing: Vec<usize>,
}

/// Terminal state of a successful `translate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// No entry contained Arabic text; no call was made
    NothingToTranslate,
    /// All prompts succeeded and results were applied
    Translated(TranslationReport),
}

impl TranslationOutcome {
    /// The report, if any translation took place
    pub fn report(&self) -> Option<&TranslationReport> {
        match self {
            Self::NothingToTranslate => None,
            Self::Translated(report) => Some(report),
        }
    }
}

/// Drives batching, dispatch and write-back for one transcript at a time
pub struct Translator<C> {
    /// Capability performing the actual translation calls
    caller: C,

    /// Prompt builder holding the byte budget
    batcher: PromptBatcher,
}

impl<C: TranslationCaller> Translator<C> {
    /// Create a translator with the given caller and per-prompt byte budget
    pub fn new(caller: C, budget: usize) -> Self {
        Self {
            caller,
            batcher: PromptBatcher::new(budget),
        }
    }

    /// Create a translator using `DEFAULT_PROMPT_BUDGET`
    pub fn with_default_budget(caller: C) -> Self {
        Self::new(caller, DEFAULT_PROMPT_BUDGET)
    }

    /// The injected caller
    pub fn caller(&self) -> &C {
        &self.caller
    }

    /// The configured byte budget
    pub fn budget(&self) -> usize {
        self.batcher.budget()
    }

    /// Build the prompts `translate` would dispatch, without calling anything
    pub fn plan(&self, transcript: &Transcript) -> PromptBatch {
        self.batcher.build_prompts(transcript)
    }

    /// Translate the Arabic entries of `transcript` in place.
    ///
    /// Prompts are dispatched sequentially. The first failing prompt aborts
    /// the run with `TranslationError::ChunkFailed`; later prompts are not
    /// sent and the transcript is left as it was.
    pub async fn translate(&self, transcript: &mut Transcript) -> Result<TranslationOutcome, TranslationError> {
        let batch = self.plan(transcript);
        if !batch.any {
            debug!("No Arabic text found in {} entries, nothing to translate", transcript.len());
            return Ok(TranslationOutcome::NothingToTranslate);
        }

        let total = batch.len();
        let start_time = Instant::now();
        let mut results: BTreeMap<i64, String> = BTreeMap::new();

        for (chunk, (prompt, indices)) in batch.prompts.iter().zip(&batch.indices).enumerate() {
            debug!(
                "Translating chunk {}/{} ({} lines, {} bytes)",
                chunk + 1, total, indices.len(), prompt.len()
            );

            let translations = self.caller.request_translation(prompt).await.map_err(|source| {
                error!("Chunk {}/{} failed: {}", chunk + 1, total, source);
                TranslationError::ChunkFailed {
                    chunk: chunk + 1,
                    total,
                    source,
                }
            })?;

            for translation in translations {
                results.insert(translation.index, translation.sentence);
            }
        }

        let report = Self::apply(transcript, &batch, results);
        info!(
            "Translated {} of {} lines in {} chunk(s) in {:?}",
            report.applied, report.lines, report.chunks, start_time.elapsed()
        );

        Ok(TranslationOutcome::Translated(report))
    }

    /// Write `results` back onto the dispatched entries of `transcript`
    fn apply(transcript: &mut Transcript, batch: &PromptBatch, results: BTreeMap<i64, String>) -> TranslationReport {
        let dispatched: BTreeSet<usize> = batch.indices.iter().flatten().copied().collect();
        let mut report = TranslationReport {
            chunks: batch.len(),
            lines: batch.line_count(),
            ..Default::default()
        };

        let mut answered = BTreeSet::new();
        for (index, sentence) in results {
            match usize::try_from(index).ok().filter(|position| dispatched.contains(position)) {
                Some(position) => {
                    transcript[position].sentence = sentence;
                    answered.insert(position);
                }
                None => report.ignored.push(index),
            }
        }

        report.applied = answered.len();
        report.missing = dispatched.difference(&answered).copied().collect();

        if !report.ignored.is_empty() {
            warn!("Ignored translations for indices that were not sent: {:?}", report.ignored);
        }
        if !report.missing.is_empty() {
            warn!("No translation returned for indices: {:?}", report.missing);
        }

        report
    }
}

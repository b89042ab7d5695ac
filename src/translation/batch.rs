/*!
 * Prompt batching.
 *
 * This module turns a transcript into a sequence of size-bounded prompts.
 * Only entries holding Arabic text are included, and every line is tagged
 * with the entry's position in the transcript so translated output can be
 * written back to the right place regardless of response order.
 */

use crate::detection::contains_target_script;
use crate::transcript::Transcript;

/// Instruction line opening every prompt
pub const PROMPT_HEADER: &str = "Translate the following sentences to English:\n";

/// Default per-prompt byte budget.
///
/// 8000 bytes keeps a prompt of Arabic text (two bytes per letter in UTF-8)
/// comfortably inside the input limits of current chat-completion models.
pub const DEFAULT_PROMPT_BUDGET: usize = 8000;

/// Result of batching a transcript
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptBatch {
    /// Prompts in transcript order
    pub prompts: Vec<String>,

    /// Transcript indices included in each prompt
    pub indices: Vec<Vec<usize>>,

    /// Whether any entry was accepted at all
    pub any: bool,
}

impl PromptBatch {
    /// Number of prompts
    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    /// Whether there is nothing to dispatch
    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    /// Total number of tagged lines across all prompts
    pub fn line_count(&self) -> usize {
        self.indices.iter().map(Vec::len).sum()
    }
}

/// Builds bounded prompts from a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBatcher {
    /// Maximum prompt length in bytes
    budget: usize,
}

impl Default for PromptBatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT_BUDGET)
    }
}

impl PromptBatcher {
    /// Create a batcher with the given byte budget
    pub fn new(budget: usize) -> Self {
        Self { budget }
    }

    /// The configured byte budget
    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Format a tagged prompt line
    pub fn format_line(index: usize, sentence: &str) -> String {
        format!("{}: {}\n", index, sentence)
    }

    /// Split the Arabic entries of `transcript` into prompts.
    ///
    /// A new prompt is started when appending a line would push the running
    /// length strictly over the budget. A line that is too long on its own
    /// still gets a prompt of its own; it is never split or dropped.
    pub fn build_prompts(&self, transcript: &Transcript) -> PromptBatch {
        let mut batch = PromptBatch::default();
        let mut current = String::from(PROMPT_HEADER);
        let mut current_indices = Vec::new();

        for (index, entry) in transcript.iter().enumerate() {
            if !contains_target_script(&entry.sentence) {
                continue;
            }
            batch.any = true;

            let line = Self::format_line(index, &entry.sentence);

            if current.len() + line.len() > self.budget && !current_indices.is_empty() {
                batch.prompts.push(std::mem::replace(&mut current, String::from(PROMPT_HEADER)));
                batch.indices.push(std::mem::take(&mut current_indices));
            }

            current.push_str(&line);
            current_indices.push(index);
        }

        if !current_indices.is_empty() {
            batch.prompts.push(current);
            batch.indices.push(current_indices);
        }

        batch
    }
}

/// Batch `transcript` with the given byte budget
pub fn build_prompts(transcript: &Transcript, budget: usize) -> PromptBatch {
    PromptBatcher::new(budget).build_prompts(transcript)
}

/*!
 * In-memory translation callers for testing.
 *
 * `MockCaller` never touches the network. It records every prompt it
 * receives and answers according to its `MockBehavior`:
 * - `MockCaller::echo()` - translates every tagged line to `[EN] <text>`
 * - `MockCaller::fixed(..)` - always returns the same pairs
 * - `MockCaller::fail_on(..)` - fails for prompts containing a trigger
 * - `MockCaller::failing()` - always fails
 */

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{IndexedTranslation, TranslationCaller};

static TAGGED_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+): (.*)$").unwrap()
});

/// Error text produced by failing mocks
pub const MOCK_ERROR_MESSAGE: &str = "Test error";

/// Behavior mode for the mock caller
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Answers every tagged line of the prompt with `[EN] <text>`
    Echo,
    /// Always returns the given pairs, whatever the prompt
    Fixed(Vec<IndexedTranslation>),
    /// Fails when the prompt contains the trigger, echoes otherwise
    FailOn(String),
    /// Fails on the n-th call (1-based), echoes otherwise
    FailOnCall(usize),
    /// Always fails
    Failing,
}

/// Mock caller recording the prompts it is asked to translate
#[derive(Debug, Clone)]
pub struct MockCaller {
    behavior: MockBehavior,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCaller {
    /// Create a mock with the given behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn fixed(pairs: Vec<IndexedTranslation>) -> Self {
        Self::new(MockBehavior::Fixed(pairs))
    }

    pub fn fail_on(trigger: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailOn(trigger.into()))
    }

    pub fn fail_on_call(call: usize) -> Self {
        Self::new(MockBehavior::FailOnCall(call))
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Translate each tagged line of a prompt to `[EN] <text>`
    pub fn echo_translations(prompt: &str) -> Vec<IndexedTranslation> {
        prompt.lines()
            .filter_map(|line| TAGGED_LINE_REGEX.captures(line))
            .filter_map(|caps| {
                let index = caps[1].parse().ok()?;
                Some(IndexedTranslation::new(index, format!("[EN] {}", &caps[2])))
            })
            .collect()
    }
}

#[async_trait]
impl TranslationCaller for MockCaller {
    async fn request_translation(&self, prompt: &str) -> Result<Vec<IndexedTranslation>, ProviderError> {
        let call = {
            let mut prompts = self.prompts.lock();
            prompts.push(prompt.to_string());
            prompts.len()
        };

        let fail = || -> Result<Vec<IndexedTranslation>, ProviderError> {
            Err(ProviderError::RequestFailed(MOCK_ERROR_MESSAGE.to_string()))
        };

        match &self.behavior {
            MockBehavior::Echo => Ok(Self::echo_translations(prompt)),
            MockBehavior::Fixed(pairs) => Ok(pairs.clone()),
            MockBehavior::FailOn(trigger) if prompt.contains(trigger.as_str()) => fail(),
            MockBehavior::FailOn(_) => Ok(Self::echo_translations(prompt)),
            MockBehavior::FailOnCall(n) if call == *n => fail(),
            MockBehavior::FailOnCall(_) => Ok(Self::echo_translations(prompt)),
            MockBehavior::Failing => fail(),
        }
    }
}

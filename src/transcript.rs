/*!
 * Transcript data model.
 *
 * A transcript is an ordered list of speaker-attributed, timestamped
 * entries. The position of an entry in the list is its identity: prompts
 * tag each line with it and translations are written back through it.
 */

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::ops::{Deref, DerefMut};

use crate::errors::TranscriptError;

/// A single utterance of the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Who said it
    pub speaker: String,

    /// When it was said, kept verbatim
    pub time: String,

    /// What was said; rewritten by translation
    pub sentence: String,
}

impl Entry {
    /// Create a new entry
    pub fn new(speaker: impl Into<String>, time: impl Into<String>, sentence: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            time: time.into(),
            sentence: sentence.into(),
        }
    }
}

/// Ordered sequence of entries, serialized as a plain JSON array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    /// Create a transcript from entries in their canonical order
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Decode a transcript from a JSON string
    pub fn from_json(json: &str) -> Result<Self, TranscriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode a transcript from any reader producing JSON
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TranscriptError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Encode the transcript as indented JSON
    pub fn to_json_pretty(&self) -> Result<String, TranscriptError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every entry carries a speaker, a time and a sentence
    pub fn validate(&self) -> Result<(), TranscriptError> {
        for (index, entry) in self.entries.iter().enumerate() {
            let fields = [
                ("speaker", &entry.speaker),
                ("time", &entry.time),
                ("sentence", &entry.sentence),
            ];
            if let Some(&(field, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
                return Err(TranscriptError::EmptyField { index, field });
            }
        }
        Ok(())
    }
}

impl From<Vec<Entry>> for Transcript {
    fn from(entries: Vec<Entry>) -> Self {
        Self::new(entries)
    }
}

impl Deref for Transcript {
    type Target = [Entry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

impl DerefMut for Transcript {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.entries
    }
}

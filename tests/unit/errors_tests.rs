/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use transcript_translator::errors::{AppError, ProviderError, TranscriptError, TranslationError};

#[test]
fn test_providerError_requestFailed_shouldDisplayCorrectly() {
    let error = ProviderError::RequestFailed("Connection timeout".to_string());
    let display = format!("{}", error);
    assert!(display.contains("API request failed"));
    assert!(display.contains("Connection timeout"));
}

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 429,
        message: "Too many requests".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("429"));
    assert!(display.contains("Too many requests"));
}

#[test]
fn test_providerError_emptyResponse_shouldDisplayCorrectly() {
    assert_eq!(ProviderError::EmptyResponse.to_string(), "API returned an empty response");
}

#[test]
fn test_translationError_chunkFailed_shouldNameChunkAndExposeSource() {
    let error = TranslationError::ChunkFailed {
        chunk: 2,
        total: 3,
        source: ProviderError::ParseError("Invalid JSON".to_string()),
    };

    assert_eq!(
        error.to_string(),
        "failed to translate chunk 2/3: Failed to parse API response: Invalid JSON"
    );
    let source = error.source().expect("source should be set");
    assert!(source.to_string().contains("Invalid JSON"));
    assert!(!error.is_initialization());
}

#[test]
fn test_translationError_callerInitialization_shouldBeDistinguishable() {
    let error = TranslationError::CallerInitialization("OPENAI_API_KEY environment variable is required".to_string());
    assert!(error.is_initialization());
    assert!(error.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn test_transcriptError_emptyField_shouldDisplayIndexAndField() {
    let error = TranscriptError::EmptyField { index: 4, field: "speaker" };
    assert_eq!(error.to_string(), "entry 4: field 'speaker' must not be empty");
}

#[test]
fn test_appError_fromTranslationError_shouldWrapCorrectly() {
    let error: AppError = TranslationError::CallerInitialization("missing key".to_string()).into();
    match error {
        AppError::Translation(inner) => assert!(inner.is_initialization()),
        other => panic!("unexpected variant: {:?}", other),
    }
}

#[test]
fn test_appError_fromIoError_shouldBecomeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "transcript.json");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
    assert!(error.to_string().contains("transcript.json"));
}

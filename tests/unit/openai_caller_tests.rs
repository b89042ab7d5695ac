/*!
 * Tests for the OpenAI caller against a local server with canned replies
 */

use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use transcript_translator::app_config::OpenAIConfig;
use transcript_translator::errors::{ProviderError, TranslationError};
use transcript_translator::providers::openai::{OpenAICaller, RESPONSE_SCHEMA_NAME};
use transcript_translator::{IndexedTranslation, TranslationCaller, Translator};

use crate::common::{greeting_transcript, init_test_logging};

const PROMPT: &str = "Translate the following sentences to English:\n0: مرحبا\n";

/// Accepts one connection, answers it with `status` and `body`, and returns the raw request
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.expect("write response");
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}/v1", addr), server)
}

/// Reads the request head and as much body as its Content-Length announces
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let read = socket.read(&mut chunk).await.expect("read request");
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        if let Some(head_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buffer[..head_end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= head_end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn caller_for(endpoint: String) -> OpenAICaller {
    let config = OpenAIConfig {
        api_key: "test-key".to_string(),
        endpoint,
        timeout_secs: 5,
        ..OpenAIConfig::default()
    };
    OpenAICaller::from_config(&config).expect("caller should build")
}

fn completion_body(content: &str, finish_reason: &str) -> String {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": finish_reason
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 8, "total_tokens": 28}
    })
    .to_string()
}

#[tokio::test]
async fn test_requestTranslation_withStructuredAnswer_shouldReturnPairs() {
    init_test_logging();
    let content = r#"{"translations":[{"index":0,"sentence":"Hello"}]}"#;
    let (endpoint, server) = serve_once("200 OK", completion_body(content, "stop")).await;

    let pairs = caller_for(endpoint).request_translation(PROMPT).await.unwrap();

    assert_eq!(pairs, vec![IndexedTranslation::new(0, "Hello")]);
    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/chat/completions "));
    assert!(request.to_lowercase().contains("authorization: bearer test-key"));
    assert!(request.contains(RESPONSE_SCHEMA_NAME));
    assert!(request.contains("0: مرحبا"));
}

#[tokio::test]
async fn test_requestTranslation_withTruncatedAnswer_shouldStillParseWhatArrived() {
    init_test_logging();
    let content = r#"{"translations":[{"index":0,"sentence":"Hello"}]}"#;
    let (endpoint, _server) = serve_once("200 OK", completion_body(content, "length")).await;

    let pairs = caller_for(endpoint).request_translation(PROMPT).await.unwrap();

    assert_eq!(pairs.len(), 1);
}

#[tokio::test]
async fn test_requestTranslation_withUnauthorized_shouldReturnAuthenticationError() {
    init_test_logging();
    let body = json!({"error": {"message": "Incorrect API key provided"}}).to_string();
    let (endpoint, _server) = serve_once("401 Unauthorized", body).await;

    let err = caller_for(endpoint).request_translation(PROMPT).await.unwrap_err();

    match err {
        ProviderError::AuthenticationError(message) => assert!(message.contains("Incorrect API key")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_requestTranslation_withServerError_shouldReturnApiError() {
    init_test_logging();
    let body = json!({"error": {"message": "The server had an error"}}).to_string();
    let (endpoint, _server) = serve_once("500 Internal Server Error", body).await;

    let err = caller_for(endpoint).request_translation(PROMPT).await.unwrap_err();

    match err {
        ProviderError::ApiError { status_code, message } => {
            assert_eq!(status_code, 500);
            assert!(message.contains("The server had an error"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_requestTranslation_withoutChoices_shouldReturnEmptyResponse() {
    init_test_logging();
    let (endpoint, _server) = serve_once("200 OK", json!({"choices": []}).to_string()).await;

    let err = caller_for(endpoint).request_translation(PROMPT).await.unwrap_err();

    assert!(matches!(err, ProviderError::EmptyResponse));
}

#[tokio::test]
async fn test_translate_withRateLimitedCaller_shouldReportFailingChunk() {
    init_test_logging();
    let body = json!({"error": {"message": "Rate limit reached"}}).to_string();
    let (endpoint, _server) = serve_once("429 Too Many Requests", body).await;
    let mut transcript = greeting_transcript();
    let original = transcript.clone();
    let translator = Translator::new(caller_for(endpoint), 10_000);

    let err = translator.translate(&mut transcript).await.unwrap_err();

    assert!(matches!(
        err,
        TranslationError::ChunkFailed {
            chunk: 1,
            total: 1,
            source: ProviderError::ApiError { status_code: 429, .. },
        }
    ));
    assert_eq!(transcript, original);
}

#[tokio::test]
async fn test_checkConnection_withReachableEndpoint_shouldSucceed() {
    let (endpoint, server) = serve_once("200 OK", json!({"data": []}).to_string()).await;

    caller_for(endpoint).check_connection().await.unwrap();

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /v1/models "));
}

#[tokio::test]
async fn test_checkConnection_withRejectedKey_shouldReturnAuthenticationError() {
    let (endpoint, _server) = serve_once("401 Unauthorized", "{}".to_string()).await;

    let err = caller_for(endpoint).check_connection().await.unwrap_err();

    assert!(matches!(err, ProviderError::AuthenticationError(_)));
}

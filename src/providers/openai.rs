use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::app_config::{OpenAIConfig, OPENAI_API_KEY_VAR};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{IndexedTranslation, Provider, TranslationCaller};

/// Name under which the response schema is registered
pub const RESPONSE_SCHEMA_NAME: &str = "IndexSentenceSchema";

/// OpenAI client for interacting with the chat completions API
#[derive(Debug)]
pub struct OpenAI {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL, e.g. `https://api.openai.com/v1`
    endpoint: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Structured output constraint
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Chat message format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// `response_format` parameter restricting output to a JSON schema
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaFormat,
}

/// Named schema for structured output
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

impl ResponseFormat {
    /// Strict JSON schema response format
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self {
            format_type: "json_schema".to_string(),
            json_schema: JsonSchemaFormat {
                name: name.into(),
                strict: true,
                schema,
            },
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A single completion choice
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIChoice {
    /// The generated message
    pub message: OpenAIMessage,

    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl OpenAIChoice {
    /// Whether generation hit the token limit before the answer was complete
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

/// Chat completion response
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIResponse {
    /// Generated choices
    pub choices: Vec<OpenAIChoice>,

    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl Default for OpenAIRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            temperature: None,
            response_format: None,
        }
    }
}

impl OpenAIRequest {
    /// Create a new request for `model`
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Constrain the output format
    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl Provider for OpenAI {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: OpenAIRequest) -> Result<OpenAIResponse, ProviderError> {
        let response = self.client.post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    ProviderError::ConnectionError(e.to_string())
                } else {
                    ProviderError::RequestFailed(format!("Failed to create chat completion: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("OpenAI API error ({}): {}", status, error_text);
            if status == StatusCode::UNAUTHORIZED {
                return Err(ProviderError::AuthenticationError(error_text));
            }
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        response.json::<OpenAIResponse>().await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI response: {}", e)))
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}/models", self.endpoint.trim_end_matches('/'));
        let response = self.client.get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(ProviderError::AuthenticationError("Invalid API key".to_string())),
            status if status.is_success() => Ok(()),
            status => Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    fn extract_text(response: &OpenAIResponse) -> String {
        response.choices.first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default()
    }
}

/// Structured-output payload returned by the model
#[derive(Debug, Deserialize)]
struct TranslationPayload {
    translations: Vec<IndexedTranslation>,
}

/// JSON schema the model's answer must follow
pub fn translation_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "translations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "index": {
                            "type": "integer",
                            "description": "The index of the sentence"
                        },
                        "sentence": {
                            "type": "string",
                            "description": "The sentence"
                        }
                    },
                    "required": ["index", "sentence"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["translations"],
        "additionalProperties": false
    })
}

/// Decode the model's structured answer
pub fn parse_translations(content: &str) -> Result<Vec<IndexedTranslation>, ProviderError> {
    let payload: TranslationPayload = serde_json::from_str(content)
        .map_err(|e| ProviderError::ParseError(format!("Failed to parse OpenAI response: {}", e)))?;
    Ok(payload.translations)
}

/// Translation caller backed by the OpenAI chat completions API
#[derive(Debug)]
pub struct OpenAICaller {
    client: OpenAI,
    model: String,
    temperature: Option<f32>,
}

impl OpenAICaller {
    /// Wrap an existing client
    pub fn new(client: OpenAI, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            temperature: None,
        }
    }

    /// Build the caller from configuration.
    ///
    /// Fails when no API key is configured or the endpoint is not a URL.
    pub fn from_config(config: &OpenAIConfig) -> Result<Self, TranslationError> {
        if config.api_key.is_empty() {
            return Err(TranslationError::CallerInitialization(format!(
                "{} environment variable is required", OPENAI_API_KEY_VAR
            )));
        }
        Url::parse(&config.endpoint).map_err(|e| {
            TranslationError::CallerInitialization(format!("invalid endpoint '{}': {}", config.endpoint, e))
        })?;

        let client = OpenAI::new(
            config.api_key.clone(),
            config.endpoint.clone(),
            Duration::from_secs(config.timeout_secs),
        ).map_err(|e| TranslationError::CallerInitialization(e.to_string()))?;

        Ok(Self {
            client,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    /// The model used for completions
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check that the endpoint is reachable and accepts the API key
    pub async fn check_connection(&self) -> Result<(), ProviderError> {
        self.client.test_connection().await
    }

    /// Build the structured-output request for one prompt
    pub fn build_request(&self, prompt: &str) -> OpenAIRequest {
        let mut request = OpenAIRequest::new(&self.model)
            .add_message("user", prompt)
            .response_format(ResponseFormat::json_schema(
                RESPONSE_SCHEMA_NAME,
                translation_response_schema(),
            ));
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }
        request
    }
}

#[async_trait]
impl TranslationCaller for OpenAICaller {
    async fn request_translation(&self, prompt: &str) -> Result<Vec<IndexedTranslation>, ProviderError> {
        let response = self.client.complete(self.build_request(prompt)).await?;

        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI usage: {} prompt + {} completion = {} tokens",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        let Some(choice) = response.choices.first() else {
            return Err(ProviderError::EmptyResponse);
        };
        if choice.is_truncated() {
            warn!("OpenAI answer was cut off at the token limit, some lines may be missing");
        }

        parse_translations(&OpenAI::extract_text(&response))
    }
}

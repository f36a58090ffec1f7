// OpenAI Chat Completion Types
// Wire types for the subset of the Chat Completions API that the mock speaks.
// Reference: https://platform.openai.com/docs/api-reference/chat

use serde::{Deserialize, Serialize};

/// Model name reported when the request does not carry one
pub const DEFAULT_MODEL: &str = "quotesim";

/// Fingerprint attached to every response object
pub const SYSTEM_FINGERPRINT: &str = "fp_quotesim";

/// Role of a message in a conversation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
    Developer,
    /// Missing or unrecognised role, e.g. the legacy `function`
    #[default]
    #[serde(other)]
    Unknown,
}

/// A message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(serde_json::Value::String(content.into())),
            name: None,
        }
    }

    /// Plain text of the message, joining text parts of multi-part content
    pub fn text(&self) -> String {
        match &self.content {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(parts)) => parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join(" "),
            _ => String::new(),
        }
    }
}

/// Chat completion request.
///
/// Every field is optional: the server answers any request shape, so the
/// body is only inspected for the model name and the streaming flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl ChatCompletionRequest {
    /// Parse a request body, treating anything unparseable as an empty request
    pub fn from_body(body: &[u8]) -> Self {
        if body.is_empty() {
            return Self::default();
        }
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                tracing::debug!(error = %e, "Unparseable completion request, using defaults");
                Self::default()
            }
        }
    }

    /// Pick out the known fields one by one, so a malformed message or an
    /// unexpected field type never discards `model` or `stream`.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let messages = value
            .get("messages")
            .and_then(serde_json::Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match Message::deserialize(item) {
                        Ok(message) => Some(message),
                        Err(e) => {
                            tracing::debug!(error = %e, "Skipping malformed message");
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            model: value
                .get("model")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            messages,
            stream: value.get("stream").and_then(serde_json::Value::as_bool),
        }
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Streaming unless explicitly disabled
    pub fn wants_stream(&self) -> bool {
        self.stream.unwrap_or(true)
    }

    /// Rough prompt size, in whitespace separated words
    pub fn prompt_words(&self) -> usize {
        self.messages
            .iter()
            .map(|m| m.text().split_whitespace().count())
            .sum()
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A choice in the completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: u32,
    pub message: Message,
    pub finish_reason: Option<String>,
}

/// Chat completion response (non-streaming)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

impl ChatCompletionResponse {
    pub fn new(
        id: String,
        model: String,
        content: String,
        finish_reason: String,
        usage: Usage,
    ) -> Self {
        Self {
            id,
            object: "chat.completion".to_string(),
            created: chrono::Utc::now().timestamp(),
            model,
            choices: vec![Choice {
                index: 0,
                message: Message::assistant(content),
                finish_reason: Some(finish_reason),
            }],
            usage: Some(usage),
            system_fingerprint: Some(SYSTEM_FINGERPRINT.to_string()),
        }
    }
}

/// Delta content in streaming response
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChunkDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A choice in streaming response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkChoice {
    pub index: u32,
    pub delta: ChunkDelta,
    pub finish_reason: Option<String>,
}

/// Streaming chat completion chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
}

impl ChatCompletionChunk {
    pub fn new(id: String, model: String, created: i64) -> Self {
        Self {
            id,
            object: "chat.completion.chunk".to_string(),
            created,
            model,
            choices: vec![],
            system_fingerprint: Some(SYSTEM_FINGERPRINT.to_string()),
        }
    }

    fn with_choice(mut self, delta: ChunkDelta, finish_reason: Option<String>) -> Self {
        self.choices = vec![ChunkChoice {
            index: 0,
            delta,
            finish_reason,
        }];
        self
    }

    pub fn with_role(self) -> Self {
        self.with_choice(
            ChunkDelta {
                role: Some(Role::Assistant),
                content: None,
            },
            None,
        )
    }

    pub fn with_content(self, content: String) -> Self {
        self.with_choice(
            ChunkDelta {
                role: None,
                content: Some(content),
            },
            None,
        )
    }

    pub fn with_finish(self, reason: String) -> Self {
        self.with_choice(ChunkDelta::default(), Some(reason))
    }

    /// Text carried by this chunk, if any
    pub fn content(&self) -> Option<&str> {
        self.choices.first()?.delta.content.as_deref()
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first()?.finish_reason.as_deref()
    }
}

/// OpenAI-style error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                error_type: error_type.into(),
                code: None,
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                error_type: "invalid_request_error".to_string(),
                code: Some("not_found".to_string()),
            },
        }
    }
}

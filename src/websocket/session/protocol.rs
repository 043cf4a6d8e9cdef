//! Assistant channel protocol

use serde::Serialize;
use serde_json::Value;

/// A prompt received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Client-chosen correlation id, if any
    pub message_id: Option<String>,
    /// Prompt text
    pub text: String,
}

impl PromptRequest {
    /// Parse `{"messageId"?, "payload": {"text"}}`.
    ///
    /// Payloads that are not a JSON object are used verbatim as the prompt.
    pub fn parse(raw: &str) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) else {
            return Self {
                message_id: None,
                text: raw.to_string(),
            };
        };

        let message_id = map
            .get("messageId")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let text = map
            .get("payload")
            .and_then(|payload| payload.get("text"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Self { message_id, text }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialPayload {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalPayload {
    pub done: bool,
}

/// Event sent to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// One fragment of the reply
    Partial {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "messageId")]
        message_id: String,
        payload: PartialPayload,
    },
    /// End of the reply
    Final {
        #[serde(rename = "sessionId")]
        session_id: String,
        #[serde(rename = "messageId")]
        message_id: String,
        payload: FinalPayload,
    },
}

impl SessionEvent {
    pub fn partial(session_id: &str, message_id: &str, text: String) -> Self {
        Self::Partial {
            session_id: session_id.to_string(),
            message_id: message_id.to_string(),
            payload: PartialPayload { text },
        }
    }

    pub fn final_event(session_id: &str, message_id: &str) -> Self {
        Self::Final {
            session_id: session_id.to_string(),
            message_id: message_id.to_string(),
            payload: FinalPayload { done: true },
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

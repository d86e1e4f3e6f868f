//! Wire protocol of the chat channel.

use serde::{Deserialize, Serialize};

/// First frame from the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthFrame {
    #[serde(default)]
    pub token: String,
}

/// Every later frame from the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Frame from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatFrame {
    /// Authentication succeeded.
    Connected { message: String },
    /// A message was accepted and is being handled.
    Thinking { message: String },
    /// The agent's reply.
    Response { message: String },
    /// Authentication or handling failed.
    Error { message: String },
}

impl ChatFrame {
    #[must_use]
    pub fn connected() -> Self {
        Self::Connected {
            message: "Connected to nanobot chat".to_string(),
        }
    }

    #[must_use]
    pub fn thinking() -> Self {
        Self::Thinking {
            message: "Processing...".to_string(),
        }
    }

    #[must_use]
    pub fn response(message: impl Into<String>) -> Self {
        Self::Response {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Frame text regardless of kind.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Connected { message }
            | Self::Thinking { message }
            | Self::Response { message }
            | Self::Error { message } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_wire_format() {
        let json = serde_json::to_string(&ChatFrame::thinking()).unwrap();
        assert_eq!(json, r#"{"type":"thinking","message":"Processing..."}"#);

        let frame: ChatFrame =
            serde_json::from_str(r#"{"type":"error","message":"Authentication failed"}"#).unwrap();
        assert_eq!(frame, ChatFrame::error("Authentication failed"));
        assert_eq!(frame.message(), "Authentication failed");
    }

    #[test]
    fn test_client_frames_tolerate_missing_fields() {
        let auth: AuthFrame = serde_json::from_str("{}").unwrap();
        assert!(auth.token.is_empty());
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi","extra":1}"#).unwrap();
        assert_eq!(request.message, "hi");
    }
}

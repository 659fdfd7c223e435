//! Message protocol between the background context and page contexts.
//!
//! # Invariants
//! - Requests are tagged by `action` using the extension's camelCase names.
//! - Every request gets exactly one response or one `ServiceError`.

use crate::model::capture::CaptureEntry;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Request understood by the background service or a page agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetClipboardData,
    AddClipboardItem {
        content: String,
        #[serde(default)]
        url: String,
        #[serde(default)]
        title: String,
    },
    ClearClipboard,
    ShowNotification {
        message: String,
    },
    GetSelectedText,
    ToggleMonitoring {
        enabled: bool,
    },
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetClipboardData => "getClipboardData",
            Self::AddClipboardItem { .. } => "addClipboardItem",
            Self::ClearClipboard => "clearClipboard",
            Self::ShowNotification { .. } => "showNotification",
            Self::GetSelectedText => "getSelectedText",
            Self::ToggleMonitoring { .. } => "toggleMonitoring",
        }
    }
}

/// Response payload; serialized without a tag, matching the extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Items {
        items: Vec<CaptureEntry>,
    },
    SelectedText {
        #[serde(rename = "selectedText")]
        selected_text: String,
    },
    Success {
        success: bool,
    },
}

impl Response {
    pub fn success(ok: bool) -> Self {
        Self::Success { success: ok }
    }
}

/// Failure to deliver or serve a request.
#[derive(Debug)]
pub enum ServiceError {
    /// The receiving context does not handle this action.
    UnsupportedAction {
        action: &'static str,
        context: &'static str,
    },
    /// The receiver has shut down or dropped the reply.
    Unavailable,
    /// The receiver's queue is full; fire-and-forget posts are dropped.
    Busy,
    /// The request body could not be decoded or the reply encoded.
    Codec(serde_json::Error),
    /// The background worker thread could not be started.
    Spawn(std::io::Error),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedAction { action, context } => {
                write!(f, "action `{action}` is not handled by the {context} context")
            }
            Self::Unavailable => write!(f, "receiver is unavailable"),
            Self::Busy => write!(f, "receiver queue is full"),
            Self::Codec(err) => write!(f, "message codec error: {err}"),
            Self::Spawn(err) => write!(f, "failed to start background worker: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

/// Decodes a JSON request body.
pub fn decode_request(raw: &str) -> Result<Request, ServiceError> {
    Ok(serde_json::from_str(raw)?)
}

/// Encodes a response as JSON.
pub fn encode_response(response: &Response) -> Result<String, ServiceError> {
    Ok(serde_json::to_string(response)?)
}

#[cfg(test)]
mod tests {
    use super::{decode_request, encode_response, Request, Response};

    #[test]
    fn decodes_extension_action_names() {
        let request =
            decode_request(r#"{"action":"addClipboardItem","content":"hi","url":"https://a.com"}"#)
                .expect("addClipboardItem should decode");
        assert_eq!(
            request,
            Request::AddClipboardItem {
                content: "hi".to_string(),
                url: "https://a.com".to_string(),
                title: String::new(),
            }
        );

        let toggle = decode_request(r#"{"action":"toggleMonitoring","enabled":false}"#)
            .expect("toggleMonitoring should decode");
        assert_eq!(toggle.action(), "toggleMonitoring");
    }

    #[test]
    fn rejects_unknown_actions() {
        assert!(decode_request(r#"{"action":"formatDisk"}"#).is_err());
    }

    #[test]
    fn encodes_untagged_responses() {
        let json = encode_response(&Response::SelectedText {
            selected_text: "abc".to_string(),
        })
        .expect("encode");
        assert_eq!(json, r#"{"selectedText":"abc"}"#);
        assert_eq!(
            encode_response(&Response::success(true)).expect("encode"),
            r#"{"success":true}"#
        );
    }
}

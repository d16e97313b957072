use serde::Serialize;
use serde_json::Value;

use crate::error::FlowError;

const CONFLICT_GUIDANCE: &str = "The flows have been modified since last fetch. Please retrieve the latest revision and try again.";
const AUTH_GUIDANCE: &str =
    "Please check your Node-RED token configuration. Ensure adminAuth is properly configured.";

/// Result of one tool call: pretty JSON for the caller plus the same payload structured.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ToolOutput {
    pub text: String,
    pub details: Value,
}

impl ToolOutput {
    pub fn json(payload: impl Serialize) -> Self {
        let details = serde_json::to_value(payload)
            .unwrap_or_else(|e| Value::String(format!("unserializable tool output: {e}")));
        ToolOutput {
            text: pretty(&details),
            details,
        }
    }

    pub fn error(err: &FlowError) -> Self {
        ToolOutput::json(ErrorReport::from_error(err))
    }

    /// True when the payload reports a failure, either as an error report or a
    /// `success: false` result.
    pub fn is_error(&self) -> bool {
        self.details.get("error").is_some()
            || self.details.get("success").and_then(Value::as_bool) == Some(false)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorReport {
    pub error: String,
    pub category: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorReport {
    pub fn from_error(err: &FlowError) -> Self {
        let category = err.category().as_str();
        let text = err.to_string();
        match err {
            FlowError::Conflict { .. } => ErrorReport {
                error: "Revision conflict detected".to_string(),
                category,
                message: CONFLICT_GUIDANCE.to_string(),
                details: Some(text),
            },
            FlowError::Unauthorized { .. } => ErrorReport {
                error: "Authentication failed".to_string(),
                category,
                message: AUTH_GUIDANCE.to_string(),
                details: Some(text),
            },
            _ => ErrorReport {
                error: text.clone(),
                category,
                message: text,
                details: None,
            },
        }
    }
}

pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

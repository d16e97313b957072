use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{field} required for {action}")]
    MissingParameter { field: String, action: String },
    #[error("invalid parameter '{field}': {message}")]
    InvalidParameter { field: String, message: String },
    #[error("Unknown pattern: {0}")]
    UnknownPattern(String),
    #[error("Template not found: {0}")]
    UnknownTemplate(String),
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Node-RED is configured in read-only mode. Write operations are disabled.")]
    ReadOnly,
    #[error("Node-RED API error: 409 Conflict{}", detail_suffix(.message))]
    Conflict { message: String },
    #[error("Node-RED API error: {status} Unauthorized{}", detail_suffix(.message))]
    Unauthorized { status: u16, message: String },
    #[error("Node-RED API error: {status}{}", detail_suffix(.message))]
    Api { status: u16, message: String },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

fn detail_suffix(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(" - {message}")
    }
}

/// Broad grouping used when an error is reported back to a tool caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Caller,
    Configuration,
    Conflict,
    Authentication,
    Remote,
    Internal,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::Caller => "caller",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Remote => "remote",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl FlowError {
    pub fn missing(field: impl Into<String>, action: impl Into<String>) -> Self {
        FlowError::MissingParameter {
            field: field.into(),
            action: action.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            FlowError::MissingParameter { .. }
            | FlowError::InvalidParameter { .. }
            | FlowError::UnknownPattern(_)
            | FlowError::UnknownTemplate(_)
            | FlowError::UnknownAction(_) => ErrorCategory::Caller,
            FlowError::ReadOnly | FlowError::Config(_) => ErrorCategory::Configuration,
            FlowError::Conflict { .. } => ErrorCategory::Conflict,
            FlowError::Unauthorized { .. } => ErrorCategory::Authentication,
            FlowError::Api { .. } | FlowError::Transport { .. } | FlowError::Decode { .. } => {
                ErrorCategory::Remote
            }
            FlowError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Map a non-success HTTP status from the Admin API to an error.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            409 => FlowError::Conflict { message },
            401 | 403 => FlowError::Unauthorized { status, message },
            _ => FlowError::Api { status, message },
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_separates_conflict_and_auth() {
        assert!(matches!(
            FlowError::from_status(409, String::new()),
            FlowError::Conflict { .. }
        ));
        assert_eq!(
            FlowError::from_status(403, "nope".into()).category(),
            ErrorCategory::Authentication
        );
        assert_eq!(
            FlowError::from_status(500, String::new()).category(),
            ErrorCategory::Remote
        );
    }

    #[test]
    fn api_error_display_includes_body() {
        let err = FlowError::from_status(500, "boom".into());
        assert_eq!(err.to_string(), "Node-RED API error: 500 - boom");
    }

    #[test]
    fn missing_parameter_names_field() {
        let err = FlowError::missing("baseUrl", "http-api pattern");
        assert_eq!(err.to_string(), "baseUrl required for http-api pattern");
        assert_eq!(err.category(), ErrorCategory::Caller);
    }
}

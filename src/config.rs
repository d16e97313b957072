use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::FlowError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:1880";

/// Scope of a deploy, sent as the `Node-RED-Deployment-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    Full,
    Nodes,
    #[default]
    Flows,
    Reload,
}

impl DeploymentType {
    pub const ALL: [DeploymentType; 4] = [
        DeploymentType::Full,
        DeploymentType::Nodes,
        DeploymentType::Flows,
        DeploymentType::Reload,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeploymentType::Full => "full",
            DeploymentType::Nodes => "nodes",
            DeploymentType::Flows => "flows",
            DeploymentType::Reload => "reload",
        }
    }
}

impl fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentType {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeploymentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FlowError::InvalidParameter {
                field: "deploymentType".to_string(),
                message: format!("expected one of full, nodes, flows, reload; got '{s}'"),
            })
    }
}

/// Connection settings for one runtime instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub base_url: String,
    /// Path prefix for the Admin API, e.g. `/admin`.
    pub admin_api_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub deployment_type: DeploymentType,
    pub read_only: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_api_root: String::new(),
            token: None,
            deployment_type: DeploymentType::default(),
            read_only: false,
        }
    }
}

impl ToolConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ToolConfig::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_trailing_slash(base_url.into());
        self
    }

    /// Read a host-supplied config object. Fields of the wrong type fall back to their
    /// defaults instead of failing.
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str);
        let defaults = ToolConfig::default();
        ToolConfig {
            base_url: trim_trailing_slash(text("baseUrl").unwrap_or(DEFAULT_BASE_URL).to_string()),
            admin_api_root: text("adminApiRoot").unwrap_or_default().to_string(),
            token: text("token").map(str::to_string),
            deployment_type: text("deploymentType")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.deployment_type),
            read_only: value.get("readOnly").and_then(Value::as_bool) == Some(true),
        }
    }

    /// Load from a JSON file, or TOML when the `toml` feature is enabled.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path)
            .with_context(|| format!("unable to read config at {}", path.display()))?;
        if let Ok(value) = serde_json::from_str::<Value>(&txt) {
            return Ok(Self::from_value(&value));
        }

        #[cfg(feature = "toml")]
        {
            if let Ok(value) = toml::from_str::<Value>(&txt) {
                return Ok(Self::from_value(&value));
            }
            anyhow::bail!(
                "unsupported config format in {}: expected JSON or TOML",
                path.display()
            );
        }

        #[cfg(not(feature = "toml"))]
        {
            anyhow::bail!(
                "unsupported config format in {}: expected JSON (enable `toml` feature for TOML support)",
                path.display()
            );
        }
    }

    /// Root URL every Admin API path is appended to.
    pub fn api_base(&self) -> String {
        format!("{}{}", self.base_url, self.admin_api_root)
    }

    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "baseUrl": {
                    "type": "string",
                    "description": "Node-RED Admin API base URL",
                    "default": DEFAULT_BASE_URL
                },
                "adminApiRoot": {
                    "type": "string",
                    "description": "Admin API root path (e.g., /admin)",
                    "default": ""
                },
                "token": {
                    "type": "string",
                    "description": "Bearer token for adminAuth authentication"
                },
                "deploymentType": {
                    "type": "string",
                    "enum": DeploymentType::ALL.map(DeploymentType::as_str),
                    "description": "Default deployment type",
                    "default": "flows"
                },
                "readOnly": {
                    "type": "boolean",
                    "description": "Read-only mode (disable write operations)",
                    "default": false
                }
            },
            "required": ["baseUrl"]
        })
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    if url.ends_with('/') {
        url.pop();
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let config = ToolConfig::from_value(&json!({
            "baseUrl": 42,
            "deploymentType": "everything",
            "readOnly": "yes"
        }));
        assert_eq!(config, ToolConfig::default());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ToolConfig::from_value(&json!({"baseUrl": "http://nr:1880/", "adminApiRoot": "/admin"}));
        assert_eq!(config.api_base(), "http://nr:1880/admin");
    }
}

//! Admin API client for a running flow runtime.
//!
//! Every call goes to `base_url + admin_api_root + path` with the v2 API header. Write
//! calls are refused locally when the configuration is read-only, before any request is
//! made.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{DeploymentType, ToolConfig};
use crate::error::{FlowError, Result};

const API_VERSION_HEADER: &str = "Node-RED-API-Version";
const API_VERSION: &str = "v2";
const DEPLOYMENT_TYPE_HEADER: &str = "Node-RED-Deployment-Type";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Current flow configuration and the revision token it was read at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default)]
    pub flows: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeployRequest {
    pub flows: Vec<Value>,
    /// Revision the caller last read; the runtime rejects the deploy with 409 when stale.
    pub rev: Option<String>,
    pub deployment_type: Option<DeploymentType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResult {
    #[serde(default)]
    pub rev: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddFlowResult {
    pub id: String,
}

/// One installed node set as reported by `GET /nodes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeModuleInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Operations the tool needs from a runtime.
#[async_trait]
pub trait FlowRuntime: Send + Sync {
    async fn get_flows(&self) -> Result<FlowsResponse>;
    async fn deploy_flows(&self, request: DeployRequest) -> Result<DeployResult>;
    async fn add_flow(&self, flow: &Value) -> Result<AddFlowResult>;
    async fn update_flow(&self, id: &str, flow: &Value) -> Result<Value>;
    async fn get_flows_state(&self) -> Result<Value>;
    async fn get_nodes(&self) -> Result<Vec<NodeModuleInfo>>;
    async fn install_node(&self, module: &str) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    base: String,
    token: Option<String>,
    read_only: bool,
}

impl AdminClient {
    pub fn new(config: &ToolConfig) -> Result<Self> {
        let base = config.api_base();
        Url::parse(&base).map_err(|e| FlowError::Config(format!("invalid base URL '{base}': {e}")))?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("node-red-flow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FlowError::Config(format!("unable to build HTTP client: {e}")))?;
        Ok(AdminClient {
            client,
            base,
            token: config.token.clone(),
            read_only: config.read_only,
        })
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}", self.base, path);
        Url::parse(&raw).map_err(|e| FlowError::Config(format!("invalid endpoint '{raw}': {e}")))
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            warn!("write refused: read-only configuration");
            return Err(FlowError::ReadOnly);
        }
        Ok(())
    }

    fn build(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_VERSION_HEADER, API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    #[instrument(skip(self, request, url), fields(url = %url))]
    async fn send(&self, request: RequestBuilder, url: &Url) -> Result<Value> {
        let response = request.send().await.map_err(|e| FlowError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let status = response.status();
        debug!(%status, "admin API response");

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let body = response.text().await.map_err(|e| FlowError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(FlowError::from_status(status.as_u16(), body));
        }
        if !is_json {
            return Ok(Value::String(body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| FlowError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path)?;
        self.send(self.build(Method::GET, url.clone()), &url).await
    }

    fn decode<T: DeserializeOwned>(&self, path: &str, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| FlowError::Decode {
            url: format!("{}{}", self.base, path),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl FlowRuntime for AdminClient {
    async fn get_flows(&self) -> Result<FlowsResponse> {
        let value = self.get("/flows").await?;
        self.decode("/flows", value)
    }

    async fn deploy_flows(&self, request: DeployRequest) -> Result<DeployResult> {
        self.ensure_writable()?;
        let url = self.endpoint("/flows")?;
        let mut body = json!({ "flows": request.flows });
        if let Some(rev) = request.rev.as_deref().filter(|r| !r.is_empty()) {
            body["rev"] = json!(rev);
        }
        let mut builder = self.build(Method::POST, url.clone()).json(&body);
        if let Some(deployment_type) = request.deployment_type {
            builder = builder.header(DEPLOYMENT_TYPE_HEADER, deployment_type.as_str());
        }
        info!(
            flows = request.flows.len(),
            deployment_type = request.deployment_type.map(DeploymentType::as_str),
            "deploying flows"
        );
        let value = self.send(builder, &url).await?;
        self.decode("/flows", value)
    }

    async fn add_flow(&self, flow: &Value) -> Result<AddFlowResult> {
        self.ensure_writable()?;
        let url = self.endpoint("/flow")?;
        let value = self
            .send(self.build(Method::POST, url.clone()).json(flow), &url)
            .await?;
        self.decode("/flow", value)
    }

    async fn update_flow(&self, id: &str, flow: &Value) -> Result<Value> {
        self.ensure_writable()?;
        let mut url = self.endpoint("/flow")?;
        url.path_segments_mut()
            .map_err(|_| FlowError::Config(format!("base URL cannot carry a path: {}", self.base)))?
            .push(id);
        self.send(self.build(Method::PUT, url.clone()).json(flow), &url)
            .await
    }

    async fn get_flows_state(&self) -> Result<Value> {
        self.get("/flows/state").await
    }

    async fn get_nodes(&self) -> Result<Vec<NodeModuleInfo>> {
        let value = self.get("/nodes").await?;
        self.decode("/nodes", value)
    }

    async fn install_node(&self, module: &str) -> Result<Value> {
        self.ensure_writable()?;
        let url = self.endpoint("/nodes")?;
        info!(module, "installing node module");
        self.send(
            self.build(Method::POST, url.clone())
                .json(&json!({ "module": module })),
            &url,
        )
        .await
    }
}

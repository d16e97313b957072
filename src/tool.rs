//! Agent-facing tool: one JSON parameter object in, one JSON result out.
//!
//! Errors never escape [`ToolExecutor::execute`]; they are folded into the result payload
//! with a category so the caller can decide whether to retry, re-read or give up.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::analyze::analyze;
use crate::catalog::{BuiltinCatalog, NodeCatalog};
use crate::client::{AdminClient, DeployRequest, FlowRuntime};
use crate::config::{DeploymentType, ToolConfig};
use crate::error::{FlowError, Result};
use crate::factory::{builtin_types, create_node};
use crate::json_output::ToolOutput;
use crate::model::{MAX_PORTS, Position, create_tab};
use crate::pattern::{PatternKind, PatternParams, TransformStage, build_pattern};
use crate::template::{
    TEMPLATE_CATEGORIES, TemplateOptions, generate_from_template, list_templates, search_templates,
};
use crate::validate::validate_items;
use crate::wiring::connect_value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAction {
    FlowsGet,
    FlowsDeploy,
    FlowAdd,
    FlowUpdate,
    FlowsStateGet,
    NodesList,
    NodesInstall,
    FlowCreate,
    NodeCreate,
    NodesConnect,
    FlowValidate,
    FlowAnalyze,
    PatternBuild,
    NodeTypes,
    TemplatesList,
    TemplateApply,
    CatalogSearch,
    CatalogInfo,
}

impl ToolAction {
    pub const ALL: [ToolAction; 18] = [
        ToolAction::FlowsGet,
        ToolAction::FlowsDeploy,
        ToolAction::FlowAdd,
        ToolAction::FlowUpdate,
        ToolAction::FlowsStateGet,
        ToolAction::NodesList,
        ToolAction::NodesInstall,
        ToolAction::FlowCreate,
        ToolAction::NodeCreate,
        ToolAction::NodesConnect,
        ToolAction::FlowValidate,
        ToolAction::FlowAnalyze,
        ToolAction::PatternBuild,
        ToolAction::NodeTypes,
        ToolAction::TemplatesList,
        ToolAction::TemplateApply,
        ToolAction::CatalogSearch,
        ToolAction::CatalogInfo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolAction::FlowsGet => "flows_get",
            ToolAction::FlowsDeploy => "flows_deploy",
            ToolAction::FlowAdd => "flow_add",
            ToolAction::FlowUpdate => "flow_update",
            ToolAction::FlowsStateGet => "flows_state_get",
            ToolAction::NodesList => "nodes_list",
            ToolAction::NodesInstall => "nodes_install",
            ToolAction::FlowCreate => "flow_create",
            ToolAction::NodeCreate => "node_create",
            ToolAction::NodesConnect => "nodes_connect",
            ToolAction::FlowValidate => "flow_validate",
            ToolAction::FlowAnalyze => "flow_analyze",
            ToolAction::PatternBuild => "pattern_build",
            ToolAction::NodeTypes => "node_types",
            ToolAction::TemplatesList => "templates_list",
            ToolAction::TemplateApply => "template_apply",
            ToolAction::CatalogSearch => "catalog_search",
            ToolAction::CatalogInfo => "catalog_info",
        }
    }

    /// Actions that change runtime state.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            ToolAction::FlowsDeploy
                | ToolAction::FlowAdd
                | ToolAction::FlowUpdate
                | ToolAction::NodesInstall
        )
    }
}

impl fmt::Display for ToolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolAction {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        ToolAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = ToolAction::ALL.iter().map(|a| a.as_str()).collect();
                FlowError::UnknownAction(format!("{s}. Valid actions: {}", valid.join(", ")))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub value: String,
}

/// Parameters of one tool call. Which fields matter depends on `action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolParams {
    pub action: ToolAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_type: Option<DeploymentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wires: Option<Vec<Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_port: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mqtt_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<PatternKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transforms: Option<Vec<TransformStage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler_func: Option<String>,
}

impl ToolParams {
    pub fn new(action: ToolAction) -> Self {
        ToolParams {
            action,
            flows: None,
            flow: None,
            flow_id: None,
            rev: None,
            deployment_type: None,
            module: None,
            label: None,
            node_type: None,
            position: None,
            properties: None,
            wires: None,
            source_id: None,
            target_id: None,
            source_port: None,
            nodes: None,
            template_id: None,
            category: None,
            query: None,
            base_url: None,
            mqtt_topic: None,
            interval: None,
            pattern_type: None,
            method: None,
            conditions: None,
            transforms: None,
            handler_func: None,
        }
    }

    /// Decode a raw parameter object, reporting an unrecognised action by name.
    pub fn from_value(value: Value) -> Result<Self> {
        if let Some(action) = value.get("action").and_then(Value::as_str) {
            action.parse::<ToolAction>()?;
        }
        serde_json::from_value(value).map_err(|e| FlowError::InvalidParameter {
            field: "params".to_string(),
            message: e.to_string(),
        })
    }

    fn require<'a, T>(&self, value: &'a Option<T>, field: &str) -> Result<&'a T> {
        value
            .as_ref()
            .ok_or_else(|| FlowError::missing(field, format!("{} action", self.action)))
    }
}

/// Node types shown as starting points by `node_types`.
const NODE_TYPE_EXAMPLES: [(&str, &str); 12] = [
    ("inject", "Message injection/timer"),
    ("debug", "Debug output"),
    ("function", "JavaScript processing"),
    ("change", "Set/change message properties"),
    ("switch", "Route by condition"),
    ("httpIn", "HTTP endpoint"),
    ("httpRequest", "HTTP client"),
    ("split", "Split array/string"),
    ("join", "Join messages"),
    ("json", "JSON parse/stringify"),
    ("file", "Write to file"),
    ("fileIn", "Read from file"),
];

pub struct ToolExecutor<R: FlowRuntime> {
    runtime: R,
    config: ToolConfig,
    catalog: BuiltinCatalog,
}

impl ToolExecutor<AdminClient> {
    pub fn from_config(config: ToolConfig) -> Result<Self> {
        let client = AdminClient::new(&config)?;
        Ok(ToolExecutor::new(client, config))
    }
}

impl<R: FlowRuntime> ToolExecutor<R> {
    pub fn new(runtime: R, config: ToolConfig) -> Self {
        ToolExecutor {
            runtime,
            config,
            catalog: BuiltinCatalog,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    /// Run a call given as raw JSON parameters.
    pub async fn execute_value(&self, params: Value) -> ToolOutput {
        match ToolParams::from_value(params) {
            Ok(params) => self.execute(params).await,
            Err(err) => {
                warn!(error = %err, "rejected tool parameters");
                ToolOutput::error(&err)
            }
        }
    }

    pub async fn execute(&self, params: ToolParams) -> ToolOutput {
        let action = params.action;
        debug!(%action, "executing tool action");
        match self.dispatch(params).await {
            Ok(output) => output,
            Err(err) => {
                warn!(%action, category = err.category().as_str(), error = %err, "tool action failed");
                ToolOutput::error(&err)
            }
        }
    }

    async fn dispatch(&self, params: ToolParams) -> Result<ToolOutput> {
        match params.action {
            ToolAction::FlowsGet => self.flows_get().await,
            ToolAction::FlowsDeploy => self.flows_deploy(&params).await,
            ToolAction::FlowAdd => self.flow_add(&params).await,
            ToolAction::FlowUpdate => self.flow_update(&params).await,
            ToolAction::FlowsStateGet => self.flows_state_get().await,
            ToolAction::NodesList => self.nodes_list().await,
            ToolAction::NodesInstall => self.nodes_install(&params).await,
            ToolAction::FlowCreate => Ok(flow_create(&params)),
            ToolAction::NodeCreate => self.node_create(&params),
            ToolAction::NodesConnect => nodes_connect(&params),
            ToolAction::FlowValidate => flow_validate(&params),
            ToolAction::FlowAnalyze => flow_analyze(&params),
            ToolAction::PatternBuild => pattern_build(&params),
            ToolAction::NodeTypes => Ok(node_types()),
            ToolAction::TemplatesList => Ok(templates_list(&params)),
            ToolAction::TemplateApply => template_apply(&params),
            ToolAction::CatalogSearch => Ok(self.catalog_search(&params)),
            ToolAction::CatalogInfo => self.catalog_info(&params),
        }
    }

    async fn flows_get(&self) -> Result<ToolOutput> {
        let current = self.runtime.get_flows().await?;
        let analysis = analyze(&current.flows);
        Ok(ToolOutput::json(json!({
            "success": true,
            "rev": current.rev,
            "flowCount": current.flows.len(),
            "summary": analysis.summary,
            "tabs": analysis.tabs,
            "flows": current.flows,
        })))
    }

    async fn flows_deploy(&self, params: &ToolParams) -> Result<ToolOutput> {
        let flows = params.require(&params.flows, "flows")?;
        if self.config.read_only {
            return Err(FlowError::ReadOnly);
        }

        let validation = validate_items(flows);
        if !validation.valid {
            return Ok(ToolOutput::json(json!({
                "error": "Flow validation failed",
                "errors": validation.errors,
                "warnings": validation.warnings,
            })));
        }

        let previous_rev = match self.runtime.get_flows().await {
            Ok(current) => current.rev,
            Err(err) => {
                debug!(error = %err, "could not read current revision before deploy");
                None
            }
        };

        let deployment_type = params
            .deployment_type
            .unwrap_or(self.config.deployment_type);
        let result = self
            .runtime
            .deploy_flows(DeployRequest {
                flows: flows.clone(),
                rev: params.rev.clone(),
                deployment_type: Some(deployment_type),
            })
            .await?;
        info!(rev = %result.rev, %deployment_type, "flows deployed");

        Ok(ToolOutput::json(json!({
            "success": true,
            "previousRev": previous_rev,
            "newRev": result.rev,
            "deploymentType": deployment_type,
            "flowCount": flows.len(),
            "warnings": validation.warnings,
        })))
    }

    async fn flow_add(&self, params: &ToolParams) -> Result<ToolOutput> {
        let flow = params.require(&params.flow, "flow")?;
        let result = self.runtime.add_flow(flow).await?;
        Ok(ToolOutput::json(json!({
            "success": true,
            "id": result.id,
            "message": format!("Flow tab added with ID: {}", result.id),
        })))
    }

    async fn flow_update(&self, params: &ToolParams) -> Result<ToolOutput> {
        let flow_id = params.require(&params.flow_id, "flowId")?;
        let flow = params.require(&params.flow, "flow")?;
        self.runtime.update_flow(flow_id, flow).await?;
        Ok(ToolOutput::json(json!({
            "success": true,
            "id": flow_id,
            "message": format!("Flow tab {flow_id} updated successfully"),
        })))
    }

    async fn flows_state_get(&self) -> Result<ToolOutput> {
        let state = self.runtime.get_flows_state().await?;
        Ok(ToolOutput::json(json!({
            "success": true,
            "state": state.get("state").cloned().unwrap_or(Value::Null),
            "details": state,
        })))
    }

    async fn nodes_list(&self) -> Result<ToolOutput> {
        let nodes = self.runtime.get_nodes().await?;
        Ok(ToolOutput::json(json!({
            "success": true,
            "nodeCount": nodes.len(),
            "nodes": nodes,
        })))
    }

    async fn nodes_install(&self, params: &ToolParams) -> Result<ToolOutput> {
        let module = params.require(&params.module, "module")?;
        let result = self.runtime.install_node(module).await?;
        Ok(ToolOutput::json(json!({
            "success": true,
            "module": module,
            "result": result,
            "message": format!("Module {module} installed successfully"),
        })))
    }

    fn node_create(&self, params: &ToolParams) -> Result<ToolOutput> {
        let node_type = params.require(&params.node_type, "nodeType")?;
        let flow_id = params.require(&params.flow_id, "flowId")?;

        let mut options = params.properties.clone().unwrap_or_default();
        if let Some(label) = &params.label {
            options.insert("name".to_string(), json!(label));
        }
        if let Some(wires) = &params.wires {
            options.insert("wires".to_string(), json!(wires));
        }
        let node = create_node(node_type, flow_id, params.position, options);
        let hint = self
            .catalog
            .resolve(node_type)
            .map(|info| info.usage)
            .unwrap_or_else(|| format!("Node type: {node_type}"));

        Ok(ToolOutput::json(json!({
            "success": true,
            "node": node,
            "hint": hint,
        })))
    }

    fn catalog_search(&self, params: &ToolParams) -> ToolOutput {
        let results = match (&params.query, &params.category) {
            (Some(query), _) => self.catalog.search(query),
            (None, Some(category)) => self.catalog.by_category(category),
            (None, None) => {
                let categories: Vec<Value> = self
                    .catalog
                    .categories()
                    .into_iter()
                    .map(|name| {
                        let count = self.catalog.by_category(&name).len();
                        json!({"name": name, "count": count})
                    })
                    .collect();
                return ToolOutput::json(json!({
                    "success": true,
                    "totalNodeTypes": self.catalog.len(),
                    "categories": categories,
                    "hint": "Use query or category to filter",
                }));
            }
        };
        let nodes: Vec<Value> = results
            .iter()
            .map(|info| {
                json!({
                    "type": info.node_type,
                    "category": info.category,
                    "description": info.description,
                    "inputs": info.inputs,
                    "outputs": info.outputs,
                })
            })
            .collect();
        ToolOutput::json(json!({
            "success": true,
            "resultCount": nodes.len(),
            "nodes": nodes,
        }))
    }

    fn catalog_info(&self, params: &ToolParams) -> Result<ToolOutput> {
        let node_type = params.require(&params.node_type, "nodeType")?;
        let Some(info) = self.catalog.resolve(node_type) else {
            let similar: Vec<String> = self
                .catalog
                .search(node_type)
                .into_iter()
                .take(5)
                .map(|info| info.node_type)
                .collect();
            return Ok(ToolOutput::json(json!({
                "success": false,
                "error": format!("Node type \"{node_type}\" not found in catalog"),
                "similarTypes": similar,
                "hint": "This might be a contrib node not in core catalog",
            })));
        };
        let mut payload = serde_json::to_value(&info)
            .map_err(|e| FlowError::Internal(format!("serialize catalog entry: {e}")))?;
        if let Value::Object(map) = &mut payload {
            map.insert("success".to_string(), json!(true));
            map.insert("quickRef".to_string(), json!(info.quick_ref()));
        }
        Ok(ToolOutput::json(payload))
    }
}

fn flow_create(params: &ToolParams) -> ToolOutput {
    let label = params.label.as_deref().unwrap_or("New Flow");
    let tab = create_tab(label, None);
    ToolOutput::json(json!({
        "success": true,
        "message": format!("Flow tab created. Use this ID for nodes: {}", tab.id),
        "tab": tab,
        "hint": "Add nodes with node_create action, then deploy with flows_deploy",
    }))
}

fn nodes_connect(params: &ToolParams) -> Result<ToolOutput> {
    let source_id = params.require(&params.source_id, "sourceId")?;
    let target_id = params.require(&params.target_id, "targetId")?;
    let port = params.source_port.unwrap_or(0);
    if port >= MAX_PORTS {
        return Err(FlowError::InvalidParameter {
            field: "sourcePort".to_string(),
            message: format!("port {port} is out of range (0..{MAX_PORTS})"),
        });
    }

    let Some(nodes) = &params.nodes else {
        return Ok(ToolOutput::json(json!({
            "success": true,
            "message": "Wire specification created. Add to source node's wires array.",
            "connection": {
                "sourceId": source_id,
                "targetId": target_id,
                "sourcePort": port,
            },
            "hint": "Update source node wires: wires[port].push(targetId)",
        })));
    };

    let index = nodes
        .iter()
        .position(|n| n.get("id").and_then(Value::as_str) == Some(source_id.as_str()))
        .ok_or_else(|| FlowError::InvalidParameter {
            field: "sourceId".to_string(),
            message: format!("Source node {source_id} not found in nodes array"),
        })?;
    let mut updated = nodes.clone();
    updated[index] = connect_value(&nodes[index], target_id, port);

    Ok(ToolOutput::json(json!({
        "success": true,
        "message": format!("Connected {source_id} → {target_id}"),
        "nodes": updated,
    })))
}

fn flow_validate(params: &ToolParams) -> Result<ToolOutput> {
    let items = params
        .flows
        .as_ref()
        .or(params.nodes.as_ref())
        .ok_or_else(|| FlowError::missing("flows or nodes array", "flow_validate"))?;
    let report = validate_items(items);
    Ok(ToolOutput::json(json!({
        "success": true,
        "valid": report.valid,
        "errors": report.errors,
        "warnings": report.warnings,
        "stats": report.stats,
    })))
}

fn flow_analyze(params: &ToolParams) -> Result<ToolOutput> {
    let flows = params
        .flows
        .as_ref()
        .ok_or_else(|| FlowError::missing("flows array", "flow_analyze"))?;
    let mut payload = serde_json::to_value(analyze(flows))
        .map_err(|e| FlowError::Internal(format!("serialize analysis: {e}")))?;
    if let Value::Object(map) = &mut payload {
        map.insert("success".to_string(), json!(true));
    }
    Ok(ToolOutput::json(payload))
}

fn pattern_build(params: &ToolParams) -> Result<ToolOutput> {
    let Some(kind) = params.pattern_type else {
        let patterns: Vec<Value> = PatternKind::ALL
            .iter()
            .map(|kind| json!({"id": kind.as_str(), "description": kind.description()}))
            .collect();
        return Ok(ToolOutput::json(json!({
            "success": true,
            "availablePatterns": patterns,
            "hint": "Specify patternType to generate a flow pattern",
        })));
    };

    let transforms = params.transforms.clone().unwrap_or_default();
    if kind == PatternKind::Transform && transforms.is_empty() {
        return Err(FlowError::missing("transforms array", "transform pattern"));
    }
    let pattern_params = PatternParams {
        label: params.label.clone(),
        handler_func: params.handler_func.clone(),
        repeat: params.interval.clone(),
        payload_type: None,
        url: params.base_url.clone(),
        method: params.method.clone(),
        property: params
            .properties
            .as_ref()
            .and_then(|p| p.get("property"))
            .and_then(Value::as_str)
            .map(str::to_string),
        conditions: params
            .conditions
            .as_ref()
            .map(|conditions| conditions.iter().map(|c| c.value.clone()).collect()),
        transforms,
    };
    let pattern = build_pattern(kind, &pattern_params)?;
    let flows = pattern.to_unit()?;

    Ok(ToolOutput::json(json!({
        "success": true,
        "message": format!("Pattern \"{kind}\" built successfully"),
        "tab": pattern.tab,
        "nodeCount": pattern.nodes.len(),
        "flows": flows,
        "hint": "Use flows_deploy to deploy, or merge with existing flows",
    })))
}

fn node_types() -> ToolOutput {
    let mut types = builtin_types();
    types.sort_unstable();
    let examples: Vec<Value> = NODE_TYPE_EXAMPLES
        .iter()
        .map(|(node_type, description)| json!({"nodeType": node_type, "description": description}))
        .collect();
    ToolOutput::json(json!({
        "success": true,
        "message": "Available node types with factory defaults",
        "nodeTypes": types,
        "count": types.len(),
        "usage": "Use node_create with nodeType parameter",
        "examples": examples,
    }))
}

fn templates_list(params: &ToolParams) -> ToolOutput {
    let templates = match (&params.query, &params.category) {
        (Some(query), _) => search_templates(query),
        (None, category) => list_templates(category.as_deref()),
    };
    ToolOutput::json(json!({
        "success": true,
        "templateCount": templates.len(),
        "templates": templates,
        "categories": TEMPLATE_CATEGORIES,
    }))
}

fn template_apply(params: &ToolParams) -> Result<ToolOutput> {
    let template_id = params.require(&params.template_id, "templateId")?;
    let generated = generate_from_template(
        template_id,
        &TemplateOptions {
            label: params.label.clone(),
            base_url: params.base_url.clone(),
            mqtt_topic: params.mqtt_topic.clone(),
            interval: params.interval.clone(),
        },
    )?;
    let flows = generated.to_unit()?;
    Ok(ToolOutput::json(json!({
        "success": true,
        "message": format!("Template \"{template_id}\" applied. Ready to deploy."),
        "description": generated.description,
        "tab": generated.tab,
        "nodeCount": generated.nodes.len(),
        "flows": flows,
        "hint": "Use flows_deploy with these flows to deploy, or merge with existing flows",
    })))
}

//! Procedural builders for common flow topologies.
//!
//! Each builder returns a fresh tab plus fully wired nodes; the result passes
//! [`crate::validate::validate`] without errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{FlowError, Result};
use crate::factory::{self, create_node};
use crate::model::{FlowPattern, Node, Position, create_tab};
use crate::wiring::{LayoutOptions, chain, connect, layout};

const DEFAULT_HTTP_HANDLER: &str = "msg.payload = { success: true };\nreturn msg;";
const DEFAULT_ERROR_HANDLER: &str = "node.error(msg.error.message);
msg.payload = {
    error: msg.error.message,
    timestamp: new Date().toISOString()
};
return msg;";
const DEFAULT_PARALLEL_HANDLER: &str = "msg.payload = msg.payload * 2;\nreturn msg;";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    Simple,
    HttpApi,
    Switch,
    ErrorHandler,
    Transform,
    Parallel,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        PatternKind::Simple,
        PatternKind::HttpApi,
        PatternKind::Switch,
        PatternKind::ErrorHandler,
        PatternKind::Transform,
        PatternKind::Parallel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PatternKind::Simple => "simple",
            PatternKind::HttpApi => "http-api",
            PatternKind::Switch => "switch",
            PatternKind::ErrorHandler => "error-handler",
            PatternKind::Transform => "transform",
            PatternKind::Parallel => "parallel",
        }
    }

    /// One-line topology sketch.
    pub fn description(self) -> &'static str {
        match self {
            PatternKind::Simple => "inject → function → debug",
            PatternKind::HttpApi => "http in → handler → http response",
            PatternKind::Switch => "input → switch → multiple outputs",
            PatternKind::ErrorHandler => "catch → handler → debug",
            PatternKind::Transform => "input → [transforms...] → output",
            PatternKind::Parallel => "split → process → join",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FlowError::UnknownPattern(s.to_string()))
    }
}

/// One stage of a transform pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStage {
    pub name: String,
    pub func: String,
}

impl TransformStage {
    pub fn new(name: impl Into<String>, func: impl Into<String>) -> Self {
        TransformStage {
            name: name.into(),
            func: func.into(),
        }
    }
}

/// Inputs shared by all builders; each builder reads only the fields it needs.
#[derive(Debug, Clone, Default)]
pub struct PatternParams {
    /// Tab label; defaults to `"<kind> Flow"`.
    pub label: Option<String>,
    pub handler_func: Option<String>,
    /// Inject repeat interval in seconds (simple pattern).
    pub repeat: Option<String>,
    pub payload_type: Option<String>,
    /// Endpoint path (http-api pattern).
    pub url: Option<String>,
    pub method: Option<String>,
    /// Message property to route on (switch pattern).
    pub property: Option<String>,
    /// Switch values; `None` falls back to two placeholders, an empty list routes
    /// everything to `else`.
    pub conditions: Option<Vec<String>>,
    pub transforms: Vec<TransformStage>,
}

pub fn build_pattern(kind: PatternKind, params: &PatternParams) -> Result<FlowPattern> {
    let label = params
        .label
        .clone()
        .unwrap_or_else(|| format!("{kind} Flow"));
    let handler = params.handler_func.as_deref();
    let pattern = match kind {
        PatternKind::Simple => build_simple(
            &label,
            handler,
            params.repeat.as_deref(),
            params.payload_type.as_deref(),
        ),
        PatternKind::HttpApi => {
            let url = params
                .url
                .as_deref()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| FlowError::missing("baseUrl", "http-api pattern"))?;
            build_http_api(&label, url, params.method.as_deref(), handler)
        }
        PatternKind::Switch => {
            let conditions = params
                .conditions
                .clone()
                .unwrap_or_else(|| vec!["A".to_string(), "B".to_string()]);
            let property = params.property.as_deref().unwrap_or("payload");
            build_switch(&label, property, &conditions)
        }
        PatternKind::ErrorHandler => build_error_handler(&label, handler),
        PatternKind::Transform => build_transform(&label, &params.transforms),
        PatternKind::Parallel => build_parallel(&label, handler),
    };
    Ok(pattern)
}

fn node(node_type: &str, tab_id: &str, position: Option<Position>, options: Value) -> Node {
    create_node(node_type, tab_id, position, factory::options(options))
}

fn at(x: f64, y: f64) -> Option<Position> {
    Some(Position::new(x, y))
}

/// inject "Start" → function "Process" → debug "Output".
pub fn build_simple(
    label: &str,
    handler_func: Option<&str>,
    repeat: Option<&str>,
    payload_type: Option<&str>,
) -> FlowPattern {
    let tab = create_tab(label, None);
    let mut inject_options = json!({
        "name": "Start",
        "payloadType": payload_type.unwrap_or("date"),
    });
    if let Some(repeat) = repeat {
        inject_options["repeat"] = json!(repeat);
    }
    let inject = node("inject", &tab.id, at(100.0, 100.0), inject_options);
    let func = node(
        "function",
        &tab.id,
        at(300.0, 100.0),
        json!({"name": "Process", "func": handler_func.unwrap_or("return msg;")}),
    );
    let debug = node("debug", &tab.id, at(500.0, 100.0), json!({"name": "Output"}));
    FlowPattern {
        nodes: chain(vec![inject, func, debug]),
        tab,
    }
}

/// `http in` → function "Handler" → `http response`.
pub fn build_http_api(
    label: &str,
    url: &str,
    method: Option<&str>,
    handler_func: Option<&str>,
) -> FlowPattern {
    let tab = create_tab(label, None);
    let method = method.unwrap_or("get").to_lowercase();
    let http_in = node(
        "http in",
        &tab.id,
        at(100.0, 100.0),
        json!({
            "name": format!("{} {}", method.to_uppercase(), url),
            "url": url,
            "method": method,
        }),
    );
    let func = node(
        "function",
        &tab.id,
        at(300.0, 100.0),
        json!({"name": "Handler", "func": handler_func.unwrap_or(DEFAULT_HTTP_HANDLER)}),
    );
    let response = node("http response", &tab.id, at(500.0, 100.0), json!({}));
    FlowPattern {
        nodes: chain(vec![http_in, func, response]),
        tab,
    }
}

/// inject "Input" → switch "Route" → one debug sink per condition plus an `else` sink.
pub fn build_switch(label: &str, property: &str, conditions: &[String]) -> FlowPattern {
    let tab = create_tab(label, None);
    let inject = node("inject", &tab.id, at(100.0, 200.0), json!({"name": "Input"}));

    let mut rules: Vec<Value> = conditions
        .iter()
        .map(|value| json!({"t": "eq", "v": value, "vt": "str"}))
        .collect();
    rules.push(json!({"t": "else", "v": "", "vt": "str"}));

    let mut switch = node(
        "switch",
        &tab.id,
        at(300.0, 200.0),
        json!({"name": "Route", "property": property, "rules": rules}),
    );

    let sinks: Vec<Node> = conditions
        .iter()
        .map(String::as_str)
        .chain(std::iter::once("else"))
        .enumerate()
        .map(|(i, name)| {
            let y = 100.0 + i as f64 * 80.0;
            node("debug", &tab.id, at(500.0, y), json!({"name": name}))
        })
        .collect();
    switch.wires = sinks.iter().map(|sink| vec![sink.id.clone()]).collect();

    let inject = connect(&inject, &switch.id, 0);
    let mut nodes = vec![inject, switch];
    nodes.extend(sinks);
    FlowPattern { tab, nodes }
}

/// catch "Catch All" → function "Handle Error" → debug "Error Log".
pub fn build_error_handler(label: &str, handler_func: Option<&str>) -> FlowPattern {
    let tab = create_tab(label, None);
    let catch = node(
        "catch",
        &tab.id,
        at(100.0, 100.0),
        json!({"name": "Catch All", "scope": "all"}),
    );
    let func = node(
        "function",
        &tab.id,
        at(300.0, 100.0),
        json!({"name": "Handle Error", "func": handler_func.unwrap_or(DEFAULT_ERROR_HANDLER)}),
    );
    let debug = node("debug", &tab.id, at(500.0, 100.0), json!({"name": "Error Log"}));
    FlowPattern {
        nodes: chain(vec![catch, func, debug]),
        tab,
    }
}

/// inject "Input" → one function per stage → debug "Output", laid out left to right.
pub fn build_transform(label: &str, transforms: &[TransformStage]) -> FlowPattern {
    let tab = create_tab(label, None);
    let mut nodes = Vec::with_capacity(transforms.len() + 2);
    nodes.push(node("inject", &tab.id, None, json!({"name": "Input"})));
    nodes.extend(transforms.iter().map(|stage| {
        node(
            "function",
            &tab.id,
            None,
            json!({"name": stage.name, "func": stage.func}),
        )
    }));
    nodes.push(node("debug", &tab.id, None, json!({"name": "Output"})));
    FlowPattern {
        nodes: layout(chain(nodes), &LayoutOptions::default()),
        tab,
    }
}

/// inject "Array Input" → split → function "Process Each" → join → debug.
pub fn build_parallel(label: &str, handler_func: Option<&str>) -> FlowPattern {
    let tab = create_tab(label, None);
    let inject = node(
        "inject",
        &tab.id,
        at(100.0, 100.0),
        json!({"name": "Array Input", "payload": "[1,2,3,4,5]", "payloadType": "json"}),
    );
    let split = node("split", &tab.id, at(250.0, 100.0), json!({}));
    let func = node(
        "function",
        &tab.id,
        at(400.0, 100.0),
        json!({"name": "Process Each", "func": handler_func.unwrap_or(DEFAULT_PARALLEL_HANDLER)}),
    );
    let join = node("join", &tab.id, at(550.0, 100.0), json!({}));
    let debug = node("debug", &tab.id, at(700.0, 100.0), json!({}));
    FlowPattern {
        nodes: chain(vec![inject, split, func, join, debug]),
        tab,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_kebab_case() {
        assert_eq!(
            "error-handler".parse::<PatternKind>().unwrap(),
            PatternKind::ErrorHandler
        );
        assert!(matches!(
            "star".parse::<PatternKind>(),
            Err(FlowError::UnknownPattern(name)) if name == "star"
        ));
    }

    #[test]
    fn default_label_uses_kind() {
        let pattern = build_pattern(PatternKind::Parallel, &PatternParams::default()).unwrap();
        assert_eq!(pattern.tab.label, "parallel Flow");
    }
}

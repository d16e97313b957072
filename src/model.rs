use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FlowError, Result};
use crate::id::generate_flow_id;

/// Reserved `z` prefix marking a node that lives inside a subflow definition.
pub const SUBFLOW_REF_PREFIX: &str = "subflow:";
pub const TAB_TYPE: &str = "tab";
pub const SUBFLOW_TYPE: &str = "subflow";

pub const DEFAULT_START_X: f64 = 100.0;
pub const DEFAULT_START_Y: f64 = 100.0;
pub const DEFAULT_NODE_SPACING: f64 = 200.0;

/// Upper bound on output ports per node.
pub const MAX_PORTS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position {
            x: DEFAULT_START_X,
            y: DEFAULT_START_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TabMarker {
    #[default]
    #[serde(rename = "tab")]
    Tab,
}

/// One page of the editor; purely organizational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTab {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: TabMarker,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
}

pub fn create_tab(label: impl Into<String>, info: Option<String>) -> FlowTab {
    FlowTab {
        id: generate_flow_id(),
        kind: TabMarker::Tab,
        label: label.into(),
        disabled: false,
        info,
    }
}

/// A processing node. Properties the graph model does not know about live in `props`
/// and keep their insertion order through a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub z: String,
    #[serde(default)]
    pub wires: Vec<Vec<String>>,
    #[serde(flatten)]
    pub props: IndexMap<String, Value>,
}

impl Node {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Position) {
        self.x = position.x;
        self.y = position.y;
    }

    pub fn port_count(&self) -> usize {
        self.wires.len()
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self)
            .map_err(|e| FlowError::Internal(format!("serialize node '{}': {e}", self.id)))
    }
}

/// One record of a deploy unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlowItem {
    Tab(FlowTab),
    Node(Node),
}

impl FlowItem {
    pub fn id(&self) -> &str {
        match self {
            FlowItem::Tab(tab) => &tab.id,
            FlowItem::Node(node) => &node.id,
        }
    }
}

impl From<FlowTab> for FlowItem {
    fn from(tab: FlowTab) -> Self {
        FlowItem::Tab(tab)
    }
}

impl From<Node> for FlowItem {
    fn from(node: Node) -> Self {
        FlowItem::Node(node)
    }
}

/// A tab together with the nodes that live on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowPattern {
    pub tab: FlowTab,
    pub nodes: Vec<Node>,
}

impl FlowPattern {
    /// Flatten into the item sequence accepted by the Admin API.
    pub fn into_items(self) -> Vec<FlowItem> {
        let mut items = Vec::with_capacity(self.nodes.len() + 1);
        items.push(FlowItem::Tab(self.tab));
        items.extend(self.nodes.into_iter().map(FlowItem::Node));
        items
    }

    pub fn to_unit(&self) -> Result<Vec<Value>> {
        self.clone().into_items().iter().map(item_to_value).collect()
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

pub fn item_to_value(item: &FlowItem) -> Result<Value> {
    serde_json::to_value(item)
        .map_err(|e| FlowError::Internal(format!("serialize flow item '{}': {e}", item.id())))
}

//! Wire and position helpers. Every function returns new records and leaves its inputs
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::{DEFAULT_NODE_SPACING, DEFAULT_START_X, DEFAULT_START_Y, MAX_PORTS, Node};

/// Connect `source` port `port` to `target_id`, growing the port list if needed.
///
/// Connecting the same pair twice leaves a single wire. Ports at or beyond
/// [`MAX_PORTS`] are ignored and the source comes back unchanged.
pub fn connect(source: &Node, target_id: &str, port: usize) -> Node {
    let mut node = source.clone();
    add_wire(&mut node.wires, target_id, port);
    node
}

/// [`connect`] for a loosely-typed node record, as supplied by tool callers.
///
/// A missing or malformed `wires` field is treated as no ports.
pub fn connect_value(source: &Value, target_id: &str, port: usize) -> Value {
    let mut record = source.clone();
    if port >= MAX_PORTS {
        warn!(port, "port out of range; record left unwired");
        return record;
    }
    let mut wires: Vec<Vec<String>> = record
        .get("wires")
        .cloned()
        .and_then(|w| serde_json::from_value(w).ok())
        .unwrap_or_default();
    add_wire(&mut wires, target_id, port);
    if let Value::Object(map) = &mut record {
        let wires = wires
            .into_iter()
            .map(|port| Value::Array(port.into_iter().map(Value::String).collect()))
            .collect();
        map.insert("wires".to_string(), Value::Array(wires));
    }
    record
}

fn add_wire(wires: &mut Vec<Vec<String>>, target_id: &str, port: usize) {
    if port >= MAX_PORTS {
        warn!(port, "port out of range; wire dropped");
        return;
    }
    if wires.len() <= port {
        wires.resize_with(port + 1, Vec::new);
    }
    let targets = &mut wires[port];
    if !targets.iter().any(|t| t == target_id) {
        targets.push(target_id.to_string());
    }
}

/// Wire each node's first port to the next node in sequence.
///
/// Nodes without output ports are passed through unwired, as is the last node.
pub fn chain(nodes: Vec<Node>) -> Vec<Node> {
    let next_ids: Vec<Option<String>> = nodes
        .iter()
        .skip(1)
        .map(|n| Some(n.id.clone()))
        .chain(std::iter::once(None))
        .collect();
    nodes
        .into_iter()
        .zip(next_ids)
        .map(|(node, next)| match next {
            Some(next) if !node.wires.is_empty() => connect(&node, &next, 0),
            _ => node,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub start_x: f64,
    pub start_y: f64,
    pub direction: Direction,
    pub spacing: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            start_x: DEFAULT_START_X,
            start_y: DEFAULT_START_Y,
            direction: Direction::Horizontal,
            spacing: DEFAULT_NODE_SPACING,
        }
    }
}

/// Place nodes in a straight line, one `spacing` step apart.
pub fn layout(nodes: Vec<Node>, options: &LayoutOptions) -> Vec<Node> {
    nodes
        .into_iter()
        .enumerate()
        .map(|(index, mut node)| {
            let offset = index as f64 * options.spacing;
            match options.direction {
                Direction::Horizontal => {
                    node.x = options.start_x + offset;
                    node.y = options.start_y;
                }
                Direction::Vertical => {
                    node.x = options.start_x;
                    node.y = options.start_y + offset;
                }
            }
            node
        })
        .collect()
}

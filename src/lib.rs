//! Construct, validate, analyze and deploy Node-RED flows.
//!
//! The core (`factory`, `wiring`, `pattern`, `validate`, `analyze`, `template`) is
//! synchronous and works on plain values. Talking to a live runtime goes through
//! [`client::FlowRuntime`], and [`tool::ToolExecutor`] wraps everything behind a single
//! JSON-in/JSON-out entry point for agents.
#![forbid(unsafe_code)]

pub mod analyze;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod id;
pub mod json_output;
pub mod model;
pub mod pattern;
pub mod template;
pub mod tool;
pub mod validate;
pub mod wiring;

pub use analyze::{AnalysisReport, TabSummary, analyze};
pub use catalog::{BuiltinCatalog, NodeCatalog, NodeTypeInfo};
pub use client::{AdminClient, DeployRequest, DeployResult, FlowRuntime, FlowsResponse};
pub use config::{DeploymentType, ToolConfig};
pub use error::{ErrorCategory, FlowError, Result};
pub use factory::{builtin_types, create_node};
pub use id::{generate_flow_id, generate_node_id};
pub use json_output::ToolOutput;
pub use model::{FlowItem, FlowPattern, FlowTab, Node, Position, create_tab};
pub use pattern::{PatternKind, PatternParams, TransformStage, build_pattern};
pub use template::{GeneratedFlow, TemplateOptions, generate_from_template};
pub use tool::{ToolAction, ToolExecutor, ToolParams};
pub use validate::{ValidationReport, ValidationStats, validate};
pub use wiring::{Direction, LayoutOptions, chain, connect, layout};

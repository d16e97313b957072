use std::collections::BTreeSet;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::Serialize;

use crate::factory::canonical_type;

/// Reference metadata for one node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTypeInfo {
    #[serde(rename = "type")]
    pub node_type: String,
    pub category: String,
    pub description: String,
    pub inputs: u32,
    pub outputs: u32,
    pub properties: Vec<String>,
    pub usage: String,
}

impl NodeTypeInfo {
    /// Multi-line summary for quick display.
    pub fn quick_ref(&self) -> String {
        let properties: Vec<&str> = self.properties.iter().take(5).map(String::as_str).collect();
        format!(
            "[{}] {}\nCategory: {}\nInputs: {}, Outputs: {}\nKey properties: {}\nUsage: {}",
            self.node_type,
            self.description,
            self.category,
            self.inputs,
            self.outputs,
            properties.join(", "),
            self.usage
        )
    }
}

pub trait NodeCatalog: Send + Sync {
    fn resolve(&self, node_type: &str) -> Option<NodeTypeInfo>;
    fn by_category(&self, category: &str) -> Vec<NodeTypeInfo>;
    /// Case-insensitive match on type, description and usage.
    fn search(&self, keyword: &str) -> Vec<NodeTypeInfo>;
    fn categories(&self) -> Vec<String>;

    fn quick_ref(&self, node_type: &str) -> Option<String> {
        self.resolve(node_type).map(|info| info.quick_ref())
    }
}

type Entry = (
    &'static str,
    &'static str,
    &'static str,
    u32,
    u32,
    &'static [&'static str],
    &'static str,
);

const ENTRIES: &[Entry] = &[
    ("inject", "common", "Injects a timestamp or message manually or on a schedule", 0, 1,
        &["payload", "payloadType", "topic", "repeat", "crontab", "once"],
        "Flow entry point: timers, schedules and manual triggers"),
    ("debug", "common", "Shows messages in the debug sidebar", 1, 0,
        &["active", "tosidebar", "console", "complete", "targetType"],
        "Inspect results at the end of a flow while developing"),
    ("complete", "common", "Receives a message when other nodes finish handling one", 0, 1,
        &["scope"],
        "Run follow-up work after specific nodes complete"),
    ("catch", "common", "Catches errors thrown by other nodes", 0, 1,
        &["scope", "uncaught"],
        "Error handling; connect to logging or alerting"),
    ("status", "common", "Receives status updates from other nodes", 0, 1,
        &["scope"],
        "Monitor node status changes"),
    ("link in", "common", "Receives messages from link out nodes", 0, 1,
        &["links"],
        "Entry point shared between flows, like a subroutine"),
    ("link out", "common", "Sends messages to link in nodes", 1, 0,
        &["mode", "links"],
        "Hand off to another flow or reusable logic"),
    ("link call", "common", "Calls a link in node and waits for the reply", 1, 1,
        &["links", "timeout"],
        "Synchronous subroutine calls"),
    ("comment", "common", "Adds a comment to the flow", 0, 0,
        &["info"],
        "Documentation inside the editor"),
    ("junction", "common", "Routing point that joins or fans out wires", 1, 1,
        &[],
        "Tidy up crossing wires"),
    ("unknown", "common", "Placeholder for a node type the runtime does not know", 1, 1,
        &[],
        "Marks a missing node type"),
    ("function", "function", "Processes messages with JavaScript", 1, 1,
        &["func", "outputs", "timeout", "initialize", "finalize"],
        "Custom logic; return msg to pass it on, an array to use several outputs"),
    ("change", "function", "Sets, changes, deletes or moves message properties", 1, 1,
        &["rules"],
        "Reshape messages without code"),
    ("switch", "function", "Routes messages by property value", 1, 2,
        &["property", "rules", "checkall", "repair"],
        "Conditional branching; one output per rule"),
    ("range", "function", "Maps a numeric value onto another range", 1, 1,
        &["minin", "maxin", "minout", "maxout", "action", "round"],
        "Scale sensor readings"),
    ("template", "function", "Renders text from a mustache template", 1, 1,
        &["template", "format", "syntax", "field", "output"],
        "Build HTML, text or JSON responses"),
    ("delay", "function", "Delays or rate limits messages", 1, 1,
        &["pauseType", "timeout", "rate", "drop"],
        "Throttling and pacing"),
    ("trigger", "function", "Sends a message, then optionally a second one after a delay", 1, 1,
        &["op1", "op2", "duration", "extend", "units"],
        "Watchdogs and timeouts"),
    ("exec", "function", "Runs a system command", 1, 3,
        &["command", "addpay", "append", "useSpawn", "timer"],
        "Shell integration; outputs are stdout, stderr and return code"),
    ("rbe", "function", "Report by exception: passes only changed values", 1, 1,
        &["func", "gap", "start"],
        "Drop duplicate readings"),
    ("http in", "network", "Creates an HTTP endpoint", 0, 1,
        &["url", "method", "upload", "swaggerDoc"],
        "REST API entry point; pair with http response"),
    ("http response", "network", "Sends the response to an http in request", 1, 0,
        &["statusCode", "headers"],
        "Terminates every http in flow"),
    ("http request", "network", "Sends an HTTP request", 1, 1,
        &["method", "url", "ret", "headers", "authType"],
        "Call external REST APIs"),
    ("websocket in", "network", "Receives WebSocket messages", 0, 1,
        &["server", "client"],
        "Real-time inbound messaging"),
    ("websocket out", "network", "Sends WebSocket messages", 1, 0,
        &["server", "client"],
        "Real-time outbound messaging"),
    ("tcp in", "network", "Receives data over TCP", 0, 1,
        &["server", "host", "port", "datamode"],
        "Raw socket servers and clients"),
    ("tcp out", "network", "Sends data over TCP", 1, 0,
        &["host", "port", "beserver"],
        "Raw socket output"),
    ("tcp request", "network", "Sends a TCP request and waits for the reply", 1, 1,
        &["server", "port", "out", "ret"],
        "Request/response over raw sockets"),
    ("udp in", "network", "Receives UDP datagrams", 0, 1,
        &["port", "multicast"],
        "Listen for broadcast or device packets"),
    ("udp out", "network", "Sends UDP datagrams", 1, 0,
        &["addr", "port", "multicast"],
        "Send packets to devices"),
    ("mqtt in", "network", "Subscribes to an MQTT topic", 0, 1,
        &["topic", "qos", "broker", "datatype"],
        "IoT telemetry intake"),
    ("mqtt out", "network", "Publishes to an MQTT topic", 1, 0,
        &["topic", "qos", "retain", "broker"],
        "IoT commands and publishing"),
    ("split", "sequence", "Splits a message into a sequence", 1, 1,
        &["splt", "spltType", "arraySplt", "stream"],
        "Process array items one at a time"),
    ("join", "sequence", "Joins a sequence back into one message", 1, 1,
        &["mode", "build", "count", "timeout"],
        "Reassemble after split"),
    ("sort", "sequence", "Sorts a sequence or array", 1, 1,
        &["target", "targetType", "order"],
        "Order items before output"),
    ("batch", "sequence", "Groups messages into batches", 1, 1,
        &["mode", "count", "overlap", "interval"],
        "Bulk inserts and windowing"),
    ("csv", "parser", "Converts between CSV text and objects", 1, 1,
        &["sep", "hdrin", "hdrout", "ret"],
        "Import and export spreadsheets"),
    ("html", "parser", "Extracts elements from HTML with a CSS selector", 1, 1,
        &["tag", "ret", "as"],
        "Web scraping"),
    ("json", "parser", "Converts between JSON text and objects", 1, 1,
        &["action", "property"],
        "Parse API responses"),
    ("xml", "parser", "Converts between XML text and objects", 1, 1,
        &["property", "attr"],
        "Legacy service integration"),
    ("yaml", "parser", "Converts between YAML text and objects", 1, 1,
        &["property"],
        "Handle YAML configuration"),
    ("file", "storage", "Writes data to a file", 1, 1,
        &["filename", "appendNewline", "createDir", "overwriteFile"],
        "Persist data on the local filesystem"),
    ("file in", "storage", "Reads data from a file", 1, 1,
        &["filename", "format", "encoding"],
        "Read local files"),
    ("watch", "storage", "Watches files or directories for changes", 0, 1,
        &["files", "recursive"],
        "React to filesystem changes"),
];

lazy_static! {
    static ref BUILTIN: IndexMap<&'static str, NodeTypeInfo> = ENTRIES
        .iter()
        .map(|(node_type, category, description, inputs, outputs, properties, usage)| {
            let info = NodeTypeInfo {
                node_type: node_type.to_string(),
                category: category.to_string(),
                description: description.to_string(),
                inputs: *inputs,
                outputs: *outputs,
                properties: properties.iter().map(|p| p.to_string()).collect(),
                usage: usage.to_string(),
            };
            (*node_type, info)
        })
        .collect();
}

/// Catalog of the runtime's core node types.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinCatalog;

impl BuiltinCatalog {
    pub fn get(&self, node_type: &str) -> Option<&'static NodeTypeInfo> {
        BUILTIN.get(canonical_type(node_type))
    }

    pub fn len(&self) -> usize {
        BUILTIN.len()
    }

    pub fn is_empty(&self) -> bool {
        BUILTIN.is_empty()
    }
}

impl NodeCatalog for BuiltinCatalog {
    fn resolve(&self, node_type: &str) -> Option<NodeTypeInfo> {
        self.get(node_type).cloned()
    }

    fn by_category(&self, category: &str) -> Vec<NodeTypeInfo> {
        BUILTIN
            .values()
            .filter(|info| info.category == category)
            .cloned()
            .collect()
    }

    fn search(&self, keyword: &str) -> Vec<NodeTypeInfo> {
        let needle = keyword.to_lowercase();
        BUILTIN
            .values()
            .filter(|info| {
                info.node_type.to_lowercase().contains(&needle)
                    || info.description.to_lowercase().contains(&needle)
                    || info.usage.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    fn categories(&self) -> Vec<String> {
        BUILTIN
            .values()
            .map(|info| info.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

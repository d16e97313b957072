//! Ready-made flows for common use cases, built from the node factory.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::info;

use crate::error::{FlowError, Result};
use crate::factory::{create_node, options};
use crate::model::{FlowItem, FlowTab, Node, Position, create_tab, item_to_value};
use crate::wiring::{LayoutOptions, chain, layout};

pub const TEMPLATE_CATEGORIES: [&str; 5] = ["api", "iot", "automation", "integration", "utility"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub tags: &'static [&'static str],
}

pub const TEMPLATES: [TemplateInfo; 10] = [
    TemplateInfo {
        id: "http-api",
        name: "HTTP REST API",
        description: "Basic API that receives an HTTP request, processes it and responds",
        category: "api",
        tags: &["http", "rest", "api", "web"],
    },
    TemplateInfo {
        id: "http-api-crud",
        name: "HTTP CRUD API",
        description: "Complete CRUD API with GET, POST, PUT and DELETE endpoints",
        category: "api",
        tags: &["http", "rest", "crud", "api"],
    },
    TemplateInfo {
        id: "mqtt-processor",
        name: "MQTT Message Processor",
        description: "IoT pattern that subscribes to an MQTT topic and processes messages",
        category: "iot",
        tags: &["mqtt", "iot", "message", "broker"],
    },
    TemplateInfo {
        id: "timer-task",
        name: "Timer Task",
        description: "Automation task that runs periodically",
        category: "automation",
        tags: &["timer", "cron", "schedule", "automation"],
    },
    TemplateInfo {
        id: "webhook-handler",
        name: "Webhook Handler",
        description: "Receives external webhooks and branches on the event type",
        category: "integration",
        tags: &["webhook", "http", "switch", "routing"],
    },
    TemplateInfo {
        id: "error-handler",
        name: "Error Handler",
        description: "Catches flow errors and logs them",
        category: "utility",
        tags: &["error", "catch", "logging", "debug"],
    },
    TemplateInfo {
        id: "http-proxy",
        name: "HTTP Proxy",
        description: "Calls an external API and returns the transformed result",
        category: "api",
        tags: &["http", "proxy", "api", "transform"],
    },
    TemplateInfo {
        id: "mqtt-to-http",
        name: "MQTT to HTTP",
        description: "Bridge that forwards MQTT messages to an HTTP API",
        category: "integration",
        tags: &["mqtt", "http", "bridge", "integration"],
    },
    TemplateInfo {
        id: "data-logger",
        name: "Data Logger",
        description: "Stores incoming data in a file or database",
        category: "utility",
        tags: &["logging", "file", "database", "storage"],
    },
    TemplateInfo {
        id: "rate-limiter",
        name: "Rate Limiter",
        description: "Limits the rate of messages",
        category: "utility",
        tags: &["rate-limit", "throttle", "delay"],
    },
];

#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    pub label: Option<String>,
    pub base_url: Option<String>,
    pub mqtt_topic: Option<String>,
    /// Repeat interval in seconds.
    pub interval: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedFlow {
    pub tab: FlowTab,
    pub nodes: Vec<Node>,
    pub description: String,
}

impl GeneratedFlow {
    /// Tab first, then nodes, ready for deployment.
    pub fn to_unit(&self) -> Result<Vec<Value>> {
        std::iter::once(FlowItem::Tab(self.tab.clone()))
            .chain(self.nodes.iter().cloned().map(FlowItem::Node))
            .map(|item| item_to_value(&item))
            .collect()
    }
}

pub fn find_template(id: &str) -> Option<&'static TemplateInfo> {
    TEMPLATES.iter().find(|t| t.id == id)
}

pub fn list_templates(category: Option<&str>) -> Vec<&'static TemplateInfo> {
    TEMPLATES
        .iter()
        .filter(|t| category.is_none_or(|c| t.category == c))
        .collect()
}

/// Match the keyword against name, description and tags, ignoring case.
pub fn search_templates(keyword: &str) -> Vec<&'static TemplateInfo> {
    let needle = keyword.to_lowercase();
    TEMPLATES
        .iter()
        .filter(|t| {
            t.name.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
                || t.tags.iter().any(|tag| tag.contains(&needle))
        })
        .collect()
}

pub fn generate_from_template(id: &str, opts: &TemplateOptions) -> Result<GeneratedFlow> {
    let template = find_template(id).ok_or_else(|| FlowError::UnknownTemplate(id.to_string()))?;
    let label = opts.label.as_deref().unwrap_or(template.name);
    let tab = create_tab(label, Some(template.description.to_string()));
    let z = tab.id.as_str();

    let nodes = match template.id {
        "http-api" => http_api(z, opts),
        "http-api-crud" => http_api_crud(z, opts),
        "mqtt-processor" => mqtt_processor(z, opts),
        "timer-task" => timer_task(z, opts),
        "webhook-handler" => webhook_handler(z, opts),
        "error-handler" => error_handler(z),
        "http-proxy" => http_proxy(z, opts),
        "mqtt-to-http" => mqtt_to_http(z, opts),
        "data-logger" => data_logger(z),
        "rate-limiter" => rate_limiter(z),
        other => return Err(FlowError::UnknownTemplate(other.to_string())),
    };

    info!(template = id, nodes = nodes.len(), "generated flow from template");
    Ok(GeneratedFlow {
        tab,
        nodes,
        description: template.description.to_string(),
    })
}

fn make(node_type: &str, z: &str, position: Option<Position>, opts: Value) -> Node {
    create_node(node_type, z, position, options(opts))
}

fn at(x: f64, y: f64) -> Option<Position> {
    Some(Position::new(x, y))
}

fn pipeline(nodes: Vec<Node>) -> Vec<Node> {
    layout(chain(nodes), &LayoutOptions::default())
}

fn function(z: &str, position: Option<Position>, name: &str, func: &str) -> Node {
    make("function", z, position, json!({"name": name, "func": func}))
}

fn http_request(z: &str) -> Node {
    make(
        "http request",
        z,
        None,
        json!({"name": "HTTP Request", "method": "use"}),
    )
}

fn http_api(z: &str, opts: &TemplateOptions) -> Vec<Node> {
    let url = opts.base_url.as_deref().unwrap_or("/api/example");
    pipeline(vec![
        make(
            "http in",
            z,
            None,
            json!({"name": "HTTP In", "url": url, "method": "get"}),
        ),
        function(
            z,
            None,
            "Handle Request",
            r#"const response = {
    success: true,
    message: "Hello from Node-RED!",
    timestamp: new Date().toISOString()
};
msg.payload = response;
return msg;"#,
        ),
        make("http response", z, None, json!({"name": "HTTP Response"})),
    ])
}

fn http_api_crud(z: &str, opts: &TemplateOptions) -> Vec<Node> {
    let base = opts.base_url.as_deref().unwrap_or("/api/items");
    let item_url = format!("{base}/:id");
    let endpoints = [
        ("GET all", base, "get", "List items", CRUD_LIST),
        ("POST create", base, "post", "Create item", CRUD_CREATE),
        ("PUT update", item_url.as_str(), "put", "Update item", CRUD_UPDATE),
        ("DELETE", item_url.as_str(), "delete", "Delete item", CRUD_DELETE),
    ];
    endpoints
        .into_iter()
        .enumerate()
        .flat_map(|(row, (name, url, method, handler, func))| {
            let y = 100.0 + row as f64 * 80.0;
            chain(vec![
                make(
                    "http in",
                    z,
                    at(100.0, y),
                    json!({"name": name, "url": url, "method": method}),
                ),
                function(z, at(300.0, y), handler, func),
                make("http response", z, at(500.0, y), json!({})),
            ])
        })
        .collect()
}

const CRUD_LIST: &str = r#"msg.payload = flow.get("items") || [];
return msg;"#;

const CRUD_CREATE: &str = r#"const items = flow.get("items") || [];
const newItem = { id: Date.now(), ...msg.payload };
items.push(newItem);
flow.set("items", items);
msg.payload = newItem;
msg.statusCode = 201;
return msg;"#;

const CRUD_UPDATE: &str = r#"const items = flow.get("items") || [];
const id = parseInt(msg.req.params.id);
const index = items.findIndex(i => i.id === id);
if (index >= 0) {
    items[index] = { ...items[index], ...msg.payload };
    flow.set("items", items);
    msg.payload = items[index];
} else {
    msg.statusCode = 404;
    msg.payload = { error: "Not found" };
}
return msg;"#;

const CRUD_DELETE: &str = r#"const items = flow.get("items") || [];
const id = parseInt(msg.req.params.id);
const index = items.findIndex(i => i.id === id);
if (index >= 0) {
    items.splice(index, 1);
    flow.set("items", items);
    msg.payload = { success: true };
} else {
    msg.statusCode = 404;
    msg.payload = { error: "Not found" };
}
return msg;"#;

fn mqtt_processor(z: &str, opts: &TemplateOptions) -> Vec<Node> {
    let topic = opts.mqtt_topic.as_deref().unwrap_or("sensors/#");
    pipeline(vec![
        make("mqtt in", z, None, json!({"name": "MQTT Subscribe", "topic": topic})),
        function(
            z,
            None,
            "Process Message",
            r#"const data = msg.payload;
msg.payload = {
    topic: msg.topic,
    data: typeof data === 'string' ? JSON.parse(data) : data,
    receivedAt: new Date().toISOString()
};
return msg;"#,
        ),
        make("debug", z, None, json!({"name": "Debug Output"})),
    ])
}

fn timer_task(z: &str, opts: &TemplateOptions) -> Vec<Node> {
    let interval = opts.interval.as_deref().unwrap_or("60");
    pipeline(vec![
        make(
            "inject",
            z,
            None,
            json!({
                "name": format!("Every {interval}s"),
                "payload": "",
                "payloadType": "date",
                "repeat": interval,
            }),
        ),
        function(
            z,
            None,
            "Run Task",
            r#"msg.payload = {
    task: "periodic-task",
    executedAt: new Date().toISOString()
};
node.status({ fill: "green", shape: "dot", text: "executed" });
return msg;"#,
        ),
        make("debug", z, None, json!({"name": "Check Result"})),
    ])
}

/// The endpoint answers immediately while the switch routes the event in parallel.
fn webhook_handler(z: &str, opts: &TemplateOptions) -> Vec<Node> {
    let url = opts.base_url.as_deref().unwrap_or("/webhook");
    let mut http_in = make(
        "http in",
        z,
        at(100.0, 200.0),
        json!({"name": "Receive Webhook", "url": url, "method": "post"}),
    );
    let mut switch = make(
        "switch",
        z,
        at(300.0, 200.0),
        json!({
            "name": "Route Event",
            "property": "payload.event",
            "rules": [
                {"t": "eq", "v": "created", "vt": "str"},
                {"t": "eq", "v": "updated", "vt": "str"},
                {"t": "eq", "v": "deleted", "vt": "str"},
                {"t": "else"}
            ],
        }),
    );
    let sinks: Vec<Node> = ["Created", "Updated", "Deleted", "Unknown"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| make("debug", z, at(500.0, 100.0 + i as f64 * 80.0), json!({"name": name})))
        .collect();
    let response = make("http response", z, at(300.0, 400.0), json!({}));

    switch.wires = sinks.iter().map(|sink| vec![sink.id.clone()]).collect();
    http_in.wires = vec![vec![switch.id.clone(), response.id.clone()]];

    let mut nodes = vec![http_in, switch];
    nodes.extend(sinks);
    nodes.push(response);
    nodes
}

fn error_handler(z: &str) -> Vec<Node> {
    pipeline(vec![
        make("catch", z, None, json!({"name": "Catch Errors", "scope": "all"})),
        function(
            z,
            None,
            "Log Error",
            r#"const errorInfo = {
    error: msg.error,
    sourceNode: msg.error?.source?.id,
    sourceType: msg.error?.source?.type,
    message: msg.error?.message,
    timestamp: new Date().toISOString()
};
const errorLog = flow.get("errorLog") || [];
errorLog.push(errorInfo);
flow.set("errorLog", errorLog.slice(-100));
msg.payload = errorInfo;
node.warn("Error caught: " + msg.error?.message);
return msg;"#,
        ),
        make("debug", z, None, json!({"name": "Error Output"})),
    ])
}

fn http_proxy(z: &str, opts: &TemplateOptions) -> Vec<Node> {
    let url = opts.base_url.as_deref().unwrap_or("/proxy");
    pipeline(vec![
        make(
            "http in",
            z,
            None,
            json!({"name": "Receive Request", "url": url, "method": "get"}),
        ),
        function(
            z,
            None,
            "Prepare Request",
            r#"msg.url = "https://api.example.com/data";
msg.method = "GET";
msg.headers = {
    "Content-Type": "application/json"
};
return msg;"#,
        ),
        http_request(z),
        function(
            z,
            None,
            "Transform Response",
            r#"msg.payload = {
    success: true,
    data: msg.payload,
    proxiedAt: new Date().toISOString()
};
return msg;"#,
        ),
        make("http response", z, None, json!({})),
    ])
}

fn mqtt_to_http(z: &str, opts: &TemplateOptions) -> Vec<Node> {
    let topic = opts.mqtt_topic.as_deref().unwrap_or("events/#");
    pipeline(vec![
        make("mqtt in", z, None, json!({"name": "MQTT Receive", "topic": topic})),
        function(
            z,
            None,
            "Prepare HTTP Request",
            r#"msg.url = "https://api.example.com/events";
msg.method = "POST";
msg.headers = { "Content-Type": "application/json" };
msg.payload = {
    topic: msg.topic,
    data: msg.payload,
    timestamp: new Date().toISOString()
};
return msg;"#,
        ),
        http_request(z),
        make("debug", z, None, json!({"name": "Check Result"})),
    ])
}

fn data_logger(z: &str) -> Vec<Node> {
    pipeline(vec![
        make(
            "inject",
            z,
            None,
            json!({"name": "Periodic Trigger", "payload": "", "payloadType": "date", "repeat": "10"}),
        ),
        function(
            z,
            None,
            "Build Log Entry",
            r#"msg.payload = {
    timestamp: new Date().toISOString(),
    data: {
        value: Math.random() * 100,
        source: "sensor-1"
    }
};
return msg;"#,
        ),
        make(
            "file",
            z,
            None,
            json!({"name": "Save to File", "filename": "node-red-log.txt", "encoding": "utf8"}),
        ),
        make("debug", z, None, json!({"name": "Check Log"})),
    ])
}

fn rate_limiter(z: &str) -> Vec<Node> {
    pipeline(vec![
        make(
            "inject",
            z,
            None,
            json!({"name": "Test Input", "payload": "test", "payloadType": "str"}),
        ),
        make(
            "delay",
            z,
            None,
            json!({"name": "Rate Limit", "pauseType": "rate", "timeout": "1", "timeoutUnits": "seconds"}),
        ),
        make("debug", z, None, json!({"name": "Limited Output"})),
    ])
}

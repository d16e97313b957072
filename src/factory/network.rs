use serde_json::json;

use super::{NodeSpec, Registry, flag_string};

pub(super) fn register(registry: &mut Registry) {
    registry.insert("http in", http_in);
    registry.insert("http response", http_response);
    registry.insert("http request", http_request);
    registry.insert("websocket in", websocket_in);
    registry.insert("websocket out", websocket_out);
    registry.insert("tcp in", tcp_in);
    registry.insert("tcp out", tcp_out);
    registry.insert("tcp request", tcp_request);
    registry.insert("udp in", udp_in);
    registry.insert("udp out", udp_out);
    registry.insert("mqtt in", mqtt_in);
    registry.insert("mqtt out", mqtt_out);
}

fn http_in(spec: &mut NodeSpec) {
    spec.prop("url", "/")
        .prop("method", "get")
        .prop("upload", false)
        .prop("swaggerDoc", "");
}

fn http_response(spec: &mut NodeSpec) {
    spec.ports(0)
        .prop("statusCode", "")
        .prop("headers", json!({}));
}

fn http_request(spec: &mut NodeSpec) {
    spec.prop("method", "GET")
        .prop("ret", "obj")
        .prop("paytoqs", "ignore")
        .prop("url", "")
        .prop("tls", "")
        .prop("persist", false)
        .prop("proxy", "")
        .prop("insecureHTTPParser", false)
        .prop("authType", "")
        .prop("senderr", false)
        .prop("headers", json!([]));
}

fn websocket_in(spec: &mut NodeSpec) {
    spec.prop("server", "").prop("client", "");
}

fn websocket_out(spec: &mut NodeSpec) {
    spec.ports(0).prop("server", "").prop("client", "");
}

fn tcp_in(spec: &mut NodeSpec) {
    spec.prop("server", "server")
        .prop("host", "")
        .prop("port", "")
        .prop("datamode", "stream")
        .prop("datatype", "buffer")
        .prop("newline", "")
        .prop("topic", "")
        .prop("trim", false)
        .prop("base64", false)
        .prop("tls", "");
}

fn tcp_out(spec: &mut NodeSpec) {
    spec.ports(0)
        .prop("host", "")
        .prop("port", "")
        .prop("beserver", "client")
        .prop("base64", false)
        .prop("end", false)
        .prop("tls", "");
}

fn tcp_request(spec: &mut NodeSpec) {
    spec.prop("server", "")
        .prop("port", "")
        .prop("out", "time")
        .prop("ret", "buffer")
        .prop("splitc", "0")
        .prop("newline", "")
        .prop("trim", false)
        .prop("tls", "");
}

fn udp_in(spec: &mut NodeSpec) {
    spec.prop("group", "")
        .prop("port", "")
        .prop("datatype", "buffer")
        .prop("iface", "")
        .prop("multicast", "false")
        .prop("ipv", "udp4");
}

fn udp_out(spec: &mut NodeSpec) {
    spec.ports(0)
        .prop("addr", "")
        .prop("port", "")
        .prop("iface", "")
        .prop("multicast", "false")
        .prop("ipv", "udp4")
        .prop("outport", "")
        .prop("base64", false);
}

fn mqtt_in(spec: &mut NodeSpec) {
    spec.prop("topic", "#")
        .prop("qos", "2")
        .prop("datatype", "auto")
        .prop("broker", "")
        .prop("nl", false)
        .prop("rap", true)
        .prop("rh", 0)
        .prop("inputs", 0);
}

fn mqtt_out(spec: &mut NodeSpec) {
    let retain = flag_string(spec.take("retain"), "true", "");
    spec.ports(0)
        .prop("topic", "")
        .prop("qos", "")
        .set("retain", retain)
        .prop("respTopic", "")
        .prop("contentType", "")
        .prop("userProps", "")
        .prop("correl", "")
        .prop("expiry", "")
        .prop("broker", "");
}

#[cfg(test)]
mod tests {
    use crate::factory::{create_node, options};
    use serde_json::json;

    #[test]
    fn http_in_keeps_caller_url_and_method() {
        let node = create_node(
            "httpIn",
            "t1",
            None,
            options(json!({"url": "/api/items", "method": "post"})),
        );
        assert_eq!(node.node_type, "http in");
        assert_eq!(node.prop("url"), Some(&json!("/api/items")));
        assert_eq!(node.prop("method"), Some(&json!("post")));
        assert_eq!(node.port_count(), 1);
    }

    #[test]
    fn mqtt_out_retain_is_stringly_typed() {
        let retained = create_node("mqtt out", "t1", None, options(json!({"retain": true})));
        assert_eq!(retained.prop("retain"), Some(&json!("true")));
        let plain = create_node("mqtt out", "t1", None, options(json!({})));
        assert_eq!(plain.prop("retain"), Some(&json!("")));
        assert!(plain.wires.is_empty());
    }
}

use serde_json::json;

use super::{NodeSpec, Registry, scope_value};

pub(super) fn register(registry: &mut Registry) {
    registry.insert("inject", inject);
    registry.insert("debug", debug);
    registry.insert("complete", complete);
    registry.insert("catch", catch);
    registry.insert("status", status);
    registry.insert("link in", link_in);
    registry.insert("link out", link_out);
    registry.insert("link call", link_call);
    registry.insert("comment", comment);
    registry.insert("junction", junction);
}

fn inject(spec: &mut NodeSpec) {
    spec.prop("payload", "")
        .prop("payloadType", "date")
        .prop("topic", "")
        .prop("repeat", "")
        .prop("crontab", "")
        .prop("once", false)
        .prop("onceDelay", 0.1);
}

fn debug(spec: &mut NodeSpec) {
    spec.ports(0)
        .prop("active", true)
        .prop("tosidebar", true)
        .prop("console", false)
        .prop("tostatus", false)
        .prop("complete", "payload")
        .prop("targetType", "msg")
        .prop("statusVal", "")
        .prop("statusType", "auto");
}

fn complete(spec: &mut NodeSpec) {
    spec.prop("scope", json!([])).prop("uncaught", false);
}

fn catch(spec: &mut NodeSpec) {
    let scope = scope_value(spec.take("scope"));
    spec.set("scope", scope).prop("uncaught", false);
}

fn status(spec: &mut NodeSpec) {
    let scope = scope_value(spec.take("scope"));
    spec.set("scope", scope);
}

fn link_in(spec: &mut NodeSpec) {
    spec.prop("links", json!([]));
}

fn link_out(spec: &mut NodeSpec) {
    spec.ports(0).prop("mode", "link").prop("links", json!([]));
}

fn link_call(spec: &mut NodeSpec) {
    spec.prop("links", json!([])).prop("timeout", 30);
}

fn comment(spec: &mut NodeSpec) {
    spec.ports(0).default_name("Comment").prop("info", "");
}

fn junction(_spec: &mut NodeSpec) {}

#[cfg(test)]
mod tests {
    use crate::factory::{create_node, options};
    use serde_json::{Value, json};

    #[test]
    fn catch_scope_defaults_to_all_errors() {
        let node = create_node("catch", "t1", None, options(json!({})));
        assert_eq!(node.prop("scope"), Some(&Value::Null));
        assert_eq!(node.prop("uncaught"), Some(&json!(false)));
        assert_eq!(node.port_count(), 1);
    }

    #[test]
    fn comment_is_terminal_and_named() {
        let node = create_node("comment", "t1", None, options(json!({"info": "notes"})));
        assert_eq!(node.name, "Comment");
        assert!(node.wires.is_empty());
        assert_eq!(node.prop("info"), Some(&json!("notes")));
    }
}

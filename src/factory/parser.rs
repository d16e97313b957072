use super::{NodeSpec, Registry};

pub(super) fn register(registry: &mut Registry) {
    registry.insert("json", json);
    registry.insert("csv", csv);
    registry.insert("html", html);
    registry.insert("xml", xml);
    registry.insert("yaml", yaml);
}

fn json(spec: &mut NodeSpec) {
    spec.prop("action", "")
        .prop("property", "payload")
        .prop("pretty", false);
}

fn csv(spec: &mut NodeSpec) {
    spec.prop("sep", ",")
        .prop("hdrin", true)
        .prop("hdrout", "none")
        .prop("multi", "mult")
        .prop("ret", "\\n")
        .prop("temp", "")
        .prop("skip", "0")
        .prop("strings", true)
        .prop("include_empty_strings", "")
        .prop("include_null_values", "");
}

fn html(spec: &mut NodeSpec) {
    spec.prop("tag", "").prop("ret", "html").prop("as", "multi");
}

fn xml(spec: &mut NodeSpec) {
    spec.prop("property", "payload")
        .prop("attr", "$")
        .prop("chr", "_");
}

fn yaml(spec: &mut NodeSpec) {
    spec.prop("property", "payload");
}

use serde_json::{Value, json};

use super::{NodeSpec, Registry, flag_string};
use crate::model::MAX_PORTS;

pub(super) fn register(registry: &mut Registry) {
    registry.insert("function", function);
    registry.insert("change", change);
    registry.insert("switch", switch);
    registry.insert("range", range);
    registry.insert("template", template);
    registry.insert("delay", delay);
    registry.insert("trigger", trigger);
    registry.insert("exec", exec);
    registry.insert("rbe", rbe);
}

/// Port count follows `outputs`, which may arrive as a number or a numeric string and is
/// capped at [`MAX_PORTS`]. The stored `outputs` always equals the port count.
fn function(spec: &mut NodeSpec) {
    let requested = match spec.take("outputs") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    let outputs = requested
        .map(|n| usize::try_from(n).unwrap_or(MAX_PORTS).min(MAX_PORTS))
        .unwrap_or(1);
    spec.ports(outputs)
        .prop("func", "return msg;")
        .set("outputs", outputs)
        .prop("timeout", 0)
        .prop("noerr", 0)
        .prop("initialize", "")
        .prop("finalize", "")
        .prop("libs", json!([]));
}

fn change(spec: &mut NodeSpec) {
    spec.prop(
        "rules",
        json!([{ "t": "set", "p": "payload", "pt": "msg", "to": "", "tot": "str" }]),
    )
    .prop("action", "")
    .prop("property", "")
    .prop("from", "")
    .prop("to", "")
    .prop("reg", false);
}

/// Port count follows the rule list; `outputs` is always derived, never taken from the
/// caller. `checkall` is `"true"` unless explicitly disabled.
fn switch(spec: &mut NodeSpec) {
    let rules = spec
        .take("rules")
        .unwrap_or_else(|| json!([{ "t": "else" }]));
    let count = rules.as_array().map(Vec::len).unwrap_or(1);
    let checkall = match spec.take("checkall") {
        Some(Value::Bool(false)) => "false",
        Some(Value::String(s)) if s == "false" => "false",
        _ => "true",
    };
    spec.take("outputs");
    spec.ports(count)
        .prop("property", "payload")
        .prop("propertyType", "msg")
        .set("rules", rules)
        .set("checkall", checkall)
        .prop("repair", false)
        .set("outputs", count);
}

fn range(spec: &mut NodeSpec) {
    spec.prop("minin", "0")
        .prop("maxin", "100")
        .prop("minout", "0")
        .prop("maxout", "1")
        .prop("action", "scale")
        .prop("round", false)
        .prop("property", "payload");
}

fn template(spec: &mut NodeSpec) {
    spec.prop("field", "payload")
        .prop("fieldType", "msg")
        .prop("format", "handlebars")
        .prop("syntax", "mustache")
        .prop("template", "{{payload}}")
        .prop("output", "str");
}

fn delay(spec: &mut NodeSpec) {
    spec.prop("pauseType", "delay")
        .prop("timeout", "5")
        .prop("timeoutUnits", "seconds")
        .prop("rate", "1")
        .prop("nbRateUnits", "1")
        .prop("rateUnits", "second")
        .prop("randomFirst", "1")
        .prop("randomLast", "5")
        .prop("randomUnits", "seconds")
        .prop("drop", false)
        .prop("allowrate", false)
        .prop("outputs", 1);
}

fn trigger(spec: &mut NodeSpec) {
    spec.prop("op1", "1")
        .prop("op2", "0")
        .prop("op1type", "str")
        .prop("op2type", "str")
        .prop("duration", "250")
        .prop("extend", true)
        .prop("overrideDelay", false)
        .prop("units", "ms")
        .prop("reset", "")
        .prop("bytopic", "all")
        .prop("topic", "topic")
        .prop("outputs", 1);
}

/// stdout, stderr, return code.
fn exec(spec: &mut NodeSpec) {
    let use_spawn = flag_string(spec.take("useSpawn"), "true", "false");
    spec.ports(3)
        .prop("command", "")
        .prop("addpay", "payload")
        .prop("append", "")
        .set("useSpawn", use_spawn)
        .prop("timer", "")
        .prop("winHide", false)
        .prop("oldrc", false);
}

fn rbe(spec: &mut NodeSpec) {
    spec.prop("func", "rbe")
        .prop("gap", "")
        .prop("start", "")
        .prop("inout", "out")
        .prop("septopics", true)
        .prop("property", "payload")
        .prop("topi", "topic");
}

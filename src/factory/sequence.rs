use serde_json::json;

use super::{NodeSpec, Registry};

pub(super) fn register(registry: &mut Registry) {
    registry.insert("split", split);
    registry.insert("join", join);
    registry.insert("sort", sort);
    registry.insert("batch", batch);
}

fn split(spec: &mut NodeSpec) {
    spec.prop("splt", "\\n")
        .prop("spltType", "str")
        .prop("arraySplt", 1)
        .prop("arraySpltType", "len")
        .prop("stream", false)
        .prop("addname", "");
}

fn join(spec: &mut NodeSpec) {
    spec.prop("mode", "auto")
        .prop("build", "array")
        .prop("property", "payload")
        .prop("propertyType", "msg")
        .prop("count", "")
        .prop("timeout", "")
        .prop("joiner", "\\n")
        .prop("joinerType", "str")
        .prop("accumulate", "false")
        .prop("reduceRight", false)
        .prop("reduceExp", "")
        .prop("reduceInit", "")
        .prop("reduceInitType", "")
        .prop("reduceFixup", "");
}

/// `asNumber` is accepted as the friendlier spelling of `as_num`.
fn sort(spec: &mut NodeSpec) {
    let as_num = spec
        .take("asNumber")
        .or_else(|| spec.take("as_num"))
        .unwrap_or(json!(false));
    spec.prop("target", "payload")
        .prop("targetType", "msg")
        .prop("msgKey", "payload")
        .prop("msgKeyType", "elem")
        .prop("seqKey", "payload")
        .prop("seqKeyType", "msg")
        .prop("order", "ascending")
        .set("as_num", as_num);
}

fn batch(spec: &mut NodeSpec) {
    spec.prop("mode", "count")
        .prop("count", 10)
        .prop("overlap", 0)
        .prop("interval", 10)
        .prop("allowEmptySequence", false)
        .prop("topics", json!([]));
}

#[cfg(test)]
mod tests {
    use crate::factory::{create_node, options};
    use serde_json::json;

    #[test]
    fn sort_maps_as_number() {
        let node = create_node("sort", "t1", None, options(json!({"asNumber": true})));
        assert_eq!(node.prop("as_num"), Some(&json!(true)));
        assert!(node.prop("asNumber").is_none());
    }
}

use super::{NodeSpec, Registry};

pub(super) fn register(registry: &mut Registry) {
    registry.insert("file", file);
    registry.insert("file in", file_in);
    registry.insert("watch", watch);
}

/// The write node keeps a passthrough port so writes can be chained.
fn file(spec: &mut NodeSpec) {
    spec.prop("filename", "")
        .prop("filenameType", "str")
        .prop("appendNewline", true)
        .prop("createDir", false)
        .prop("overwriteFile", "false")
        .prop("encoding", "none");
}

fn file_in(spec: &mut NodeSpec) {
    spec.prop("filename", "")
        .prop("filenameType", "str")
        .prop("format", "utf8")
        .prop("chunk", false)
        .prop("sendError", false)
        .prop("encoding", "utf8")
        .prop("allProps", false);
}

fn watch(spec: &mut NodeSpec) {
    spec.prop("files", "").prop("recursive", true);
}

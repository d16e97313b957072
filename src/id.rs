use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

lazy_static! {
    static ref NODE_ID_RE: Regex = Regex::new(r"^[0-9a-f]{8}\.[0-9a-f]{6}$").unwrap();
}

/// Generate an identifier in the runtime's `xxxxxxxx.xxxxxx` hex convention.
pub fn generate_node_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}.{}", &hex[..8], &hex[8..14])
}

/// Tabs share the node identifier space.
pub fn generate_flow_id() -> String {
    generate_node_id()
}

pub fn is_generated_id(candidate: &str) -> bool {
    NODE_ID_RE.is_match(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_match_runtime_shape() {
        let id = generate_node_id();
        assert_eq!(id.len(), 15);
        assert!(is_generated_id(&id), "unexpected id shape: {id}");
    }

    #[test]
    fn ids_do_not_collide_in_a_session() {
        let ids: HashSet<String> = (0..2_000).map(|_| generate_flow_id()).collect();
        assert_eq!(ids.len(), 2_000);
    }

    #[test]
    fn rejects_foreign_shapes() {
        assert!(!is_generated_id("n1"));
        assert!(!is_generated_id("ABCDEF12.345678"));
        assert!(!is_generated_id("abcdef12345678"));
    }
}

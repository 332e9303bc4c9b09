//! Secret redaction for configuration leaving the node.
//!
//! Only top-level keys are removed. The snapshot is read without a schema, so
//! there is no reliable way to know what a nested key means; a denylisted
//! name inside a nested table is left alone.

use crate::config::Document;

/// Top-level keys that never leave the node.
pub const SANITIZED_FIELDS: [&str; 5] = [
    "secret",
    "node_secret",
    "storage",
    "slave_options",
    "auth_override",
];

/// Strip every denylisted top-level key from an owned document.
pub fn sanitize(mut document: Document) -> Document {
    for field in SANITIZED_FIELDS {
        document.remove(field);
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_removes_denylisted_keys_only() {
        let input = document(json!({
            "secret": "s",
            "node_secret": "n",
            "storage": { "password": "p" },
            "slave_options": { "rpc_key": "k" },
            "auth_override": {},
            "listener": { "bind_address": "0.0.0.0:8080" },
            "allow_remote_config": true,
        }));

        let output = sanitize(input);
        assert_eq!(
            output,
            document(json!({
                "listener": { "bind_address": "0.0.0.0:8080" },
                "allow_remote_config": true,
            }))
        );
    }

    #[test]
    fn test_absent_keys_are_fine() {
        let input = document(json!({ "listener": {} }));
        assert_eq!(sanitize(input.clone()), input);
        assert!(sanitize(Document::new()).is_empty());
    }

    #[test]
    fn test_is_a_fixed_point() {
        let input = document(json!({ "secret": "s", "cluster": { "topic": "t" } }));
        let once = sanitize(input);
        assert_eq!(sanitize(once.clone()), once);
    }

    #[test]
    fn test_nested_names_are_not_redacted() {
        let input = document(json!({ "plugins": { "secret": "still here" } }));
        assert_eq!(sanitize(input)["plugins"]["secret"], "still here");
    }
}

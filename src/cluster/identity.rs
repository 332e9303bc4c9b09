//! Node identity and message addressing.

use std::fmt;

use uuid::Uuid;

/// Who this process is on the cluster bus.
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    hostname: String,
    node_id: String,
    pid: u32,
}

impl NodeIdentity {
    /// Create an identity from explicit parts. A `pid` of 0 means unknown.
    pub fn new(hostname: impl Into<String>, node_id: impl Into<String>, pid: u32) -> Self {
        Self {
            hostname: hostname.into(),
            node_id: node_id.into(),
            pid,
        }
    }

    /// Resolve the identity of the running process.
    ///
    /// Overrides win; otherwise the hostname comes from the OS and the node ID
    /// is freshly generated.
    pub fn from_host(node_id: Option<String>, hostname: Option<String>) -> Self {
        let hostname = hostname.unwrap_or_else(host_name);
        let node_id = node_id.unwrap_or_else(|| format!("solo-{}", Uuid::new_v4()));
        Self::new(hostname, node_id, std::process::id())
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether a message addressed to (`hostname`, `node_id`) is for this node.
    pub fn matches(&self, hostname: &str, node_id: &str) -> bool {
        matches(hostname, node_id, self)
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.hostname, self.node_id)
    }
}

/// Addressing rule for cluster messages.
///
/// Either identifier is enough: a message is dropped only when the hostname
/// and the node ID both differ from the local ones. This lets operators
/// address containers whose hostname churns by node ID, and the reverse.
pub fn matches(target_hostname: &str, target_node_id: &str, local: &NodeIdentity) -> bool {
    target_hostname == local.hostname || target_node_id == local.node_id
}

#[cfg(unix)]
fn host_name() -> String {
    match nix::unistd::gethostname() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read hostname");
            String::new()
        }
    }
}

#[cfg(not(unix))]
fn host_name() -> String {
    std::env::var("COMPUTERNAME")
        .or_else(|_| std::env::var("HOSTNAME"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> NodeIdentity {
        NodeIdentity::new("gw-1", "node-1", 4242)
    }

    #[test]
    fn test_either_identifier_is_enough() {
        let me = local();
        assert!(matches("gw-1", "node-1", &me));
        assert!(matches("gw-1", "someone-else", &me));
        assert!(matches("other-host", "node-1", &me));
    }

    #[test]
    fn test_double_mismatch_is_rejected() {
        assert!(!matches("other-host", "other-node", &local()));
        assert!(!local().matches("", ""));
    }

    #[test]
    fn test_empty_local_hostname_does_not_match_everything() {
        let me = NodeIdentity::new("", "node-1", 1);
        assert!(!me.matches("gw-1", "node-2"));
        // An empty target is compared literally.
        assert!(me.matches("", "node-2"));
    }

    #[test]
    fn test_from_host_applies_overrides() {
        let me = NodeIdentity::from_host(Some("fixed".into()), Some("box".into()));
        assert_eq!(me.node_id(), "fixed");
        assert_eq!(me.hostname(), "box");
        assert_eq!(me.pid(), std::process::id());
    }

    #[test]
    fn test_generated_node_ids_are_unique() {
        let a = NodeIdentity::from_host(None, Some("box".into()));
        let b = NodeIdentity::from_host(None, Some("box".into()));
        assert!(a.node_id().starts_with("solo-"));
        assert_ne!(a.node_id(), b.node_id());
    }
}

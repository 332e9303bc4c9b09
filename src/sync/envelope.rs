//! Wire messages for configuration sync.
//!
//! Everything on the bus is JSON. The outer [`Notification`] carries a command
//! tag and the inner envelope as an encoded string, so nodes can route on the
//! tag without understanding the payload.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Document;

/// Commands understood by the sync protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Apply a new configuration on the addressed node.
    PushConfig,
    /// Ask the addressed node for a sanitized snapshot.
    GetConfig,
    /// Snapshot sent in reply to [`Command::GetConfig`].
    ConfigResponse,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::PushConfig => "push-config",
            Command::GetConfig => "get-config",
            Command::ConfigResponse => "config-response",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push-config" => Ok(Command::PushConfig),
            "get-config" => Ok(Command::GetConfig),
            "config-response" => Ok(Command::ConfigResponse),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

/// Outer frame of every bus message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub command: String,
    pub payload: String,
}

impl Notification {
    pub fn new(command: Command, payload: String) -> Self {
        Self {
            command: command.as_str().to_string(),
            payload,
        }
    }

    /// Wrap an envelope, encoding it as the payload.
    pub fn wrap<T: Serialize>(command: Command, envelope: &T) -> serde_json::Result<Self> {
        Ok(Self::new(command, serde_json::to_string(envelope)?))
    }

    /// Parsed command tag; `None` for traffic this protocol does not handle.
    pub fn command(&self) -> Option<Command> {
        self.command.parse().ok()
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn decode(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Push of a new configuration to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushConfigEnvelope {
    #[serde(default)]
    pub target_hostname: String,
    #[serde(default)]
    pub target_node_id: String,
    /// Seconds since the epoch. Informational only.
    #[serde(default)]
    pub timestamp: i64,
    /// Configuration document, merged over the target's current config.
    pub configuration: Value,
}

/// Request for a sanitized configuration snapshot.
///
/// The requester fields carry the address of the node expected to answer;
/// that node matches them against its own identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigQueryEnvelope {
    #[serde(default)]
    pub requester_hostname: String,
    #[serde(default)]
    pub requester_node_id: String,
    #[serde(default)]
    pub timestamp: i64,
}

/// Sanitized snapshot published in reply to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshotEnvelope {
    pub responder_hostname: String,
    pub responder_node_id: String,
    pub configuration: Document,
    pub timestamp: i64,
}

/// Current wall-clock time in epoch seconds.
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_tags() {
        for command in [Command::PushConfig, Command::GetConfig, Command::ConfigResponse] {
            assert_eq!(command.as_str().parse::<Command>(), Ok(command));
        }
        assert!("restart".parse::<Command>().is_err());
    }

    #[test]
    fn test_unknown_command_is_not_an_error() {
        let notification = Notification::decode(r#"{"command":"key-changed","payload":""}"#).unwrap();
        assert_eq!(notification.command(), None);
    }

    #[test]
    fn test_push_envelope_requires_configuration() {
        let err = serde_json::from_value::<PushConfigEnvelope>(json!({
            "target_hostname": "gw-1",
            "target_node_id": "node-1",
        }));
        assert!(err.is_err());

        let envelope: PushConfigEnvelope = serde_json::from_value(json!({
            "target_node_id": "node-1",
            "configuration": {}
        }))
        .unwrap();
        assert_eq!(envelope.target_hostname, "");
        assert_eq!(envelope.timestamp, 0);
    }

    #[test]
    fn test_wrap_embeds_encoded_envelope() {
        let query = ConfigQueryEnvelope {
            requester_hostname: "gw-1".into(),
            requester_node_id: "node-1".into(),
            timestamp: 10,
        };
        let notification = Notification::wrap(Command::GetConfig, &query).unwrap();
        assert_eq!(notification.command, "get-config");

        let decoded: ConfigQueryEnvelope = serde_json::from_str(&notification.payload).unwrap();
        assert_eq!(decoded, query);
    }
}

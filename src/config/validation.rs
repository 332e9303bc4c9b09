//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and address formats
//! - Refuse to enable the admin API without a secret to authenticate it
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs on every load and on every merged remote push before it is written

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("observability.log_format: unknown format '{0}' (expected pretty or json)")]
    UnknownLogFormat(String),

    #[error("secret must be set before enabling the admin API")]
    MissingAdminSecret,
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }

    if config.cluster.topic.trim().is_empty() {
        errors.push(ValidationError::Empty("cluster.topic"));
    }
    if config.cluster.backup_dir.trim().is_empty() {
        errors.push(ValidationError::Empty("cluster.backup_dir"));
    }
    if matches!(config.cluster.node_id.as_deref(), Some(id) if id.trim().is_empty()) {
        errors.push(ValidationError::Empty("cluster.node_id"));
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::UnknownLogFormat(other.to_string())),
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.secret.trim().is_empty() {
            errors.push(ValidationError::MissingAdminSecret);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.listener.max_connections = 0;
        config.observability.log_format = "xml".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::Zero("listener.max_connections")));
        assert!(errors.contains(&ValidationError::UnknownLogFormat("xml".into())));
    }

    #[test]
    fn test_admin_requires_secret() {
        let mut config = GatewayConfig::default();
        config.admin.enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::MissingAdminSecret])
        );

        config.secret = "  ".into();
        assert!(validate_config(&config).is_err());

        config.secret = "s3cret".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_err());

        config.observability.metrics_enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}

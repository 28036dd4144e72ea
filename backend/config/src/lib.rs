//! `phoneagent-config`: phone agent configuration management.
//!
//! Provides:
//! - Typed config schema (bus names, feature flags, logging)
//! - YAML read/write with atomic backup rotation
//! - `${ENV_VAR}` substitution and `PHONEAGENT_*` overrides
//! - Default value application
//! - Schema validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use schema::{AgentConfig, BusConfig, FeaturesConfig, LoggingConfig};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use env::{
    apply_env_overrides, apply_env_overrides_with, contains_env_var_reference, resolve_env_vars,
    resolve_env_vars_with, MissingEnvVarError,
};
pub use defaults::apply_all_defaults;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Apply `${VAR}` substitution, `PHONEAGENT_*` overrides and defaults to a
/// freshly loaded config. Does not validate.
pub fn prepare(raw_config: AgentConfig) -> Result<AgentConfig> {
    prepare_with(raw_config, &std::env::vars().collect())
}

/// [`prepare`] against a provided environment.
pub fn prepare_with(raw_config: AgentConfig, env: &HashMap<String, String>) -> Result<AgentConfig> {
    let value: Value = serde_json::to_value(&raw_config)
        .context("Failed to serialize config for processing")?;
    let value = resolve_env_vars_with(&value, env)
        .context("Failed to resolve env vars in config")?;

    let config: AgentConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    Ok(apply_all_defaults(apply_env_overrides_with(config, env)))
}

/// Load, prepare and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// errors abort the load; warnings are logged.
pub async fn load_and_prepare(path: &Path) -> Result<AgentConfig> {
    let config = prepare(load_config(path).await?)?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("{} config error(s) in {}", report.errors.len(), path.display());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_and_prepare_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "features:\n  alertStatus: false\n").await.unwrap();

        let config = load_and_prepare(&path).await.unwrap();
        assert!(!config.alert_status_enabled());
        assert_eq!(config.bus.as_ref().unwrap().agent_path.as_deref(), Some("/test/phoneagent"));
    }

    #[tokio::test]
    async fn test_load_and_prepare_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "bus:\n  agentPath: nope\n").await.unwrap();

        let err = load_and_prepare(&path).await.unwrap_err();
        assert!(err.to_string().contains("config error"));
    }

    #[tokio::test]
    async fn test_prepare_substitutes_before_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        tokio::fs::write(&path, "bus:\n  agentPath: /test/${AGENT_NAME}\n")
            .await
            .unwrap();

        let raw = load_config(&path).await.unwrap();
        assert!(!validate(&apply_all_defaults(raw.clone())).is_valid());

        let env = HashMap::from([("AGENT_NAME".to_string(), "kitchen".to_string())]);
        let config = prepare_with(raw, &env).unwrap();
        assert_eq!(config.agent_path(), "/test/kitchen");
        assert!(validate(&config).is_valid());
    }

    #[test]
    fn test_prepare_fails_on_missing_var() {
        let config = AgentConfig {
            bus: Some(BusConfig {
                agent_path: Some("/test/${AGENT_NAME}".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(prepare_with(config, &HashMap::new()).is_err());
    }

    #[test]
    fn test_prepare_applies_overrides_and_defaults() {
        let env = HashMap::from([("PHONEAGENT_LOG_LEVEL".to_string(), "debug".to_string())]);
        let config = prepare_with(AgentConfig::default(), &env).unwrap();
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.ringer_key(), "ringing.alert.type");
    }
}

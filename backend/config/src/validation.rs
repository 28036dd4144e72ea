//! Config validation: schema checks with user-friendly error messages.

use crate::schema::AgentConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &AgentConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_bus(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_bus(config: &AgentConfig, report: &mut ValidationReport) {
    let paths = [
        ("bus.agentPath", config.agent_path()),
        ("bus.phoneAlertPath", config.phone_alert_path()),
        ("bus.profilePath", config.profile_path()),
        ("bus.callContextPath", config.call_context_path()),
    ];
    for (path, value) in paths {
        if !is_object_path(value) {
            report.error(path, format!("'{value}' is not a valid object path"));
        }
    }

    let names = [
        ("bus.agentInterface", config.agent_interface()),
        ("bus.phoneAlertService", config.phone_alert_service()),
        ("bus.phoneAlertInterface", config.phone_alert_interface()),
        ("bus.profileService", config.profile_service()),
        ("bus.callContextService", config.call_context_service()),
    ];
    for (path, value) in names {
        if value.trim().is_empty() {
            report.error(path, "Bus name cannot be empty");
        } else if !value.contains('.') {
            report.warn(path, format!("'{value}' has a single element; bus names are dotted"));
        }
    }

    if config.ringer_key().trim().is_empty() {
        report.error("bus.ringerKey", "Ringer key cannot be empty");
    }

    if config.buffer_size() == 0 {
        report.error("bus.bufferSize", "bufferSize must be >= 1");
    }
}

fn validate_logging(config: &AgentConfig, report: &mut ValidationReport) {
    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    let level = config.log_level();
    // Directive strings like "phoneagent=debug" are left to EnvFilter.
    if !level.contains('=') && !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        report.warn("logging.level", format!("Unknown log level '{level}'"));
    }
}

/// An object path is `/` or `/`-separated non-empty elements of `[A-Za-z0-9_]`.
fn is_object_path(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    let Some(rest) = path.strip_prefix('/') else {
        return false;
    };
    rest.split('/').all(|element| {
        !element.is_empty()
            && element
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BusConfig, LoggingConfig};

    #[test]
    fn test_default_config_is_valid() {
        let report = validate(&AgentConfig::default());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_bad_object_path() {
        let config = AgentConfig {
            bus: Some(BusConfig {
                agent_path: Some("test/phoneagent".into()),
                phone_alert_path: Some("/test//phonealert".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].path, "bus.agentPath");
        assert_eq!(report.errors[1].path, "bus.phoneAlertPath");
    }

    #[test]
    fn test_zero_buffer_and_empty_key() {
        let config = AgentConfig {
            bus: Some(BusConfig {
                buffer_size: Some(0),
                ringer_key: Some(" ".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert!(!report.is_valid());
        assert!(report.errors.iter().any(|e| e.path == "bus.bufferSize"));
        assert!(report.errors.iter().any(|e| e.path == "bus.ringerKey"));
    }

    #[test]
    fn test_unknown_log_level_warns() {
        let config = AgentConfig {
            logging: Some(LoggingConfig {
                level: Some("loud".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_object_path_rules() {
        assert!(is_object_path("/"));
        assert!(is_object_path("/com/nokia/CallUi/ActiveCall"));
        assert!(!is_object_path(""));
        assert!(!is_object_path("/trailing/"));
        assert!(!is_object_path("/has-dash"));
    }
}

//! Config defaults: applies default values to parsed config.

use crate::schema::{AgentConfig, BusConfig, FeaturesConfig, LoggingConfig};

pub const DEFAULT_AGENT_PATH: &str = "/test/phoneagent";
pub const DEFAULT_AGENT_INTERFACE: &str = "org.bluez.PhoneAgent";

pub const DEFAULT_PHONE_ALERT_SERVICE: &str = "org.bluez";
pub const DEFAULT_PHONE_ALERT_PATH: &str = "/test/phonealert";
pub const DEFAULT_PHONE_ALERT_INTERFACE: &str = "org.bluez.PhoneAlert";

pub const DEFAULT_PROFILE_SERVICE: &str = "com.nokia.profiled";
pub const DEFAULT_PROFILE_PATH: &str = "/com/nokia/profiled";
pub const DEFAULT_RINGER_KEY: &str = "ringing.alert.type";

pub const DEFAULT_CALL_CONTEXT_SERVICE: &str = "com.nokia.CallUi.Context";
pub const DEFAULT_CALL_CONTEXT_PATH: &str = "/com/nokia/CallUi/ActiveCall";

/// Default agent queue capacity.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: AgentConfig) -> AgentConfig {
    let config = apply_bus_defaults(config);
    let config = apply_feature_defaults(config);
    apply_logging_defaults(config)
}

fn fill(slot: &mut Option<String>, default: &str) {
    if slot.is_none() {
        *slot = Some(default.to_string());
    }
}

/// Ensure every bus name and path is set.
fn apply_bus_defaults(mut config: AgentConfig) -> AgentConfig {
    let bus = config.bus.get_or_insert_with(BusConfig::default);
    fill(&mut bus.agent_path, DEFAULT_AGENT_PATH);
    fill(&mut bus.agent_interface, DEFAULT_AGENT_INTERFACE);
    fill(&mut bus.phone_alert_service, DEFAULT_PHONE_ALERT_SERVICE);
    fill(&mut bus.phone_alert_path, DEFAULT_PHONE_ALERT_PATH);
    fill(&mut bus.phone_alert_interface, DEFAULT_PHONE_ALERT_INTERFACE);
    fill(&mut bus.profile_service, DEFAULT_PROFILE_SERVICE);
    fill(&mut bus.profile_path, DEFAULT_PROFILE_PATH);
    fill(&mut bus.ringer_key, DEFAULT_RINGER_KEY);
    fill(&mut bus.call_context_service, DEFAULT_CALL_CONTEXT_SERVICE);
    fill(&mut bus.call_context_path, DEFAULT_CALL_CONTEXT_PATH);
    if bus.buffer_size.is_none() {
        bus.buffer_size = Some(DEFAULT_BUFFER_SIZE);
    }
    config
}

/// Both features default to on.
fn apply_feature_defaults(mut config: AgentConfig) -> AgentConfig {
    let features = config.features.get_or_insert_with(FeaturesConfig::default);
    features.alert_status.get_or_insert(true);
    features.end_on_active.get_or_insert(true);
    config
}

fn apply_logging_defaults(mut config: AgentConfig) -> AgentConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    fill(&mut logging.level, DEFAULT_LOG_LEVEL);
    logging.json.get_or_insert(false);
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_everything() {
        let config = apply_all_defaults(AgentConfig::default());
        let bus = config.bus.as_ref().unwrap();
        assert_eq!(bus.agent_path.as_deref(), Some(DEFAULT_AGENT_PATH));
        assert_eq!(bus.ringer_key.as_deref(), Some(DEFAULT_RINGER_KEY));
        assert_eq!(bus.buffer_size, Some(DEFAULT_BUFFER_SIZE));
        let features = config.features.as_ref().unwrap();
        assert_eq!(features.alert_status, Some(true));
        assert_eq!(features.end_on_active, Some(true));
        assert_eq!(config.log_level(), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_defaults_keep_explicit_values() {
        let config = AgentConfig {
            features: Some(FeaturesConfig::legacy()),
            bus: Some(BusConfig {
                ringer_key: Some("ringing.alert.tone".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = apply_all_defaults(config);
        assert!(!config.alert_status_enabled());
        assert!(!config.end_on_active());
        assert_eq!(config.ringer_key(), "ringing.alert.tone");
        assert_eq!(config.agent_path(), DEFAULT_AGENT_PATH);
    }
}

//! Phone agent configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every field is optional on
//! disk; `defaults::apply_all_defaults` fills the gaps after loading.

use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_AGENT_INTERFACE, DEFAULT_AGENT_PATH, DEFAULT_BUFFER_SIZE,
    DEFAULT_CALL_CONTEXT_PATH, DEFAULT_CALL_CONTEXT_SERVICE, DEFAULT_LOG_LEVEL,
    DEFAULT_PHONE_ALERT_INTERFACE, DEFAULT_PHONE_ALERT_PATH, DEFAULT_PHONE_ALERT_SERVICE,
    DEFAULT_PROFILE_PATH, DEFAULT_PROFILE_SERVICE, DEFAULT_RINGER_KEY,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the phone agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Bus names, object paths and interfaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<BusConfig>,

    /// Behavior flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeaturesConfig>,

    /// Logging configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusConfig {
    /// Object path the agent is exported on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_interface: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_alert_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_alert_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_alert_interface: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_path: Option<String>,
    /// Profile key holding the ringer alert type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ringer_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_context_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_context_path: Option<String>,

    /// Agent queue capacity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<usize>,
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturesConfig {
    /// Track alert status, notify the peer and expose `GetAlertStatus`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_status: Option<bool>,
    /// Treat an answered call like an ended one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_on_active: Option<bool>,
}

impl FeaturesConfig {
    /// The older agent variant: no alert status, only incoming/ended states.
    pub fn legacy() -> Self {
        Self {
            alert_status: Some(false),
            end_on_active: Some(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rotated NDJSON logs; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

// ---------------------------------------------------------------------------
// Effective values
// ---------------------------------------------------------------------------

fn or_default<'a>(value: Option<&'a String>, default: &'a str) -> &'a str {
    value.map(String::as_str).unwrap_or(default)
}

impl AgentConfig {
    fn bus_field(&self, pick: impl Fn(&BusConfig) -> Option<&String>, default: &'static str) -> &str {
        or_default(self.bus.as_ref().and_then(pick), default)
    }

    pub fn agent_path(&self) -> &str {
        self.bus_field(|b| b.agent_path.as_ref(), DEFAULT_AGENT_PATH)
    }

    pub fn agent_interface(&self) -> &str {
        self.bus_field(|b| b.agent_interface.as_ref(), DEFAULT_AGENT_INTERFACE)
    }

    pub fn phone_alert_service(&self) -> &str {
        self.bus_field(|b| b.phone_alert_service.as_ref(), DEFAULT_PHONE_ALERT_SERVICE)
    }

    pub fn phone_alert_path(&self) -> &str {
        self.bus_field(|b| b.phone_alert_path.as_ref(), DEFAULT_PHONE_ALERT_PATH)
    }

    pub fn phone_alert_interface(&self) -> &str {
        self.bus_field(|b| b.phone_alert_interface.as_ref(), DEFAULT_PHONE_ALERT_INTERFACE)
    }

    pub fn profile_service(&self) -> &str {
        self.bus_field(|b| b.profile_service.as_ref(), DEFAULT_PROFILE_SERVICE)
    }

    pub fn profile_path(&self) -> &str {
        self.bus_field(|b| b.profile_path.as_ref(), DEFAULT_PROFILE_PATH)
    }

    pub fn ringer_key(&self) -> &str {
        self.bus_field(|b| b.ringer_key.as_ref(), DEFAULT_RINGER_KEY)
    }

    pub fn call_context_service(&self) -> &str {
        self.bus_field(|b| b.call_context_service.as_ref(), DEFAULT_CALL_CONTEXT_SERVICE)
    }

    pub fn call_context_path(&self) -> &str {
        self.bus_field(|b| b.call_context_path.as_ref(), DEFAULT_CALL_CONTEXT_PATH)
    }

    pub fn buffer_size(&self) -> usize {
        self.bus
            .as_ref()
            .and_then(|b| b.buffer_size)
            .unwrap_or(DEFAULT_BUFFER_SIZE)
    }

    pub fn alert_status_enabled(&self) -> bool {
        self.features
            .as_ref()
            .and_then(|f| f.alert_status)
            .unwrap_or(true)
    }

    pub fn end_on_active(&self) -> bool {
        self.features
            .as_ref()
            .and_then(|f| f.end_on_active)
            .unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        or_default(
            self.logging.as_ref().and_then(|l| l.level.as_ref()),
            DEFAULT_LOG_LEVEL,
        )
    }

    pub fn log_dir(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

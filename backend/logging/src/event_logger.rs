//! Agent Event Logger
//!
//! Structured agent events (call state, ringer changes, peer notifications,
//! method calls) emitted on the `agent_events` tracing target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum AgentEvent {
    CallState {
        state: String,
        on_call: bool,
        records_json: String,
    },
    RingerChanged {
        from: Option<String>,
        to: String,
        reason: String,
    },
    Notification {
        method: String,
        argument: String,
    },
    Command {
        method: String,
        outcome: String,
    },
    Error {
        error_msg: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub event: AgentEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Logs an agent event, redacting raw payloads first. Returns the logged entry.
    pub fn log_event(agent: &str, mut event: AgentEvent) -> EventLogEntry {
        match &mut event {
            AgentEvent::CallState { records_json, .. } => {
                *records_json = redact_sensitive_data(records_json);
            }
            AgentEvent::Error { error_msg } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            _ => {}
        }

        let entry = EventLogEntry {
            agent: agent.into(),
            timestamp: Utc::now(),
            event,
        };

        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "agent_events", event = %json, "Agent event");
        entry
    }
}

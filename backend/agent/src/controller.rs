//! Ringer silence state machine.
//!
//! Tracks whether a call is ringing, remembers the ringer profile before it
//! is silenced, and puts it back once the call is over or silent mode is
//! cancelled. Alert status changes and ringer changes are forwarded to the
//! phone-alert peer.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use phoneagent_config::AgentConfig;
use phoneagent_core::{
    AgentError, AlertStatus, CallState, Command, CommandReply, PhoneAlert, ProfileChange,
    ProfileService, RINGER_SILENT,
};
use phoneagent_logging::{redact_sensitive_data, AgentEvent, EventLogger};

/// Behavior switches and names the controller needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Object path registered with the phone peer
    pub agent_path: String,
    /// Profile key holding the ringer alert type
    pub ringer_key: String,
    /// Track and report alert status
    pub alert_status: bool,
    /// An answered call ends the ringing phase
    pub end_on_active: bool,
}

impl ControllerOptions {
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            agent_path: config.agent_path().to_string(),
            ringer_key: config.ringer_key().to_string(),
            alert_status: config.alert_status_enabled(),
            end_on_active: config.end_on_active(),
        }
    }
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

/// Point-in-time copy of the controller state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub on_call: bool,
    pub ringer_setting: Option<String>,
    pub saved_ringer_setting: Option<String>,
    pub silent_mode: bool,
    pub alert_status: u8,
}

pub struct RingerSilenceController {
    options: ControllerOptions,
    profiled: Arc<dyn ProfileService>,
    phone: Arc<dyn PhoneAlert>,
    on_call: bool,
    ringer_setting: Option<String>,
    /// Never holds `"Silent"` or an empty string.
    saved_ringer_setting: Option<String>,
    silent_mode: bool,
    alert_status: AlertStatus,
}

impl RingerSilenceController {
    pub fn new(
        options: ControllerOptions,
        profiled: Arc<dyn ProfileService>,
        phone: Arc<dyn PhoneAlert>,
    ) -> Self {
        Self {
            options,
            profiled,
            phone,
            on_call: false,
            ringer_setting: None,
            saved_ringer_setting: None,
            silent_mode: false,
            alert_status: AlertStatus::default(),
        }
    }

    /// Read the current ringer, publish the initial alert status and
    /// register with the phone peer.
    pub async fn initialize(&mut self) -> Result<()> {
        let ringer = self
            .profiled
            .get_value(&self.options.ringer_key)
            .await
            .map_err(profile_error)?;
        info!(ringer = %ringer, "Initial ringer setting");
        self.ringer_setting = Some(ringer);

        self.refresh_alert_status().await?;

        self.phone
            .register_agent(&self.options.agent_path)
            .await
            .map_err(peer_error)?;
        info!(path = %self.options.agent_path, "Registered agent with phone alert peer");
        Ok(())
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn on_call(&self) -> bool {
        self.on_call
    }

    pub fn ringer_setting(&self) -> Option<&str> {
        self.ringer_setting.as_deref()
    }

    pub fn saved_ringer_setting(&self) -> Option<&str> {
        self.saved_ringer_setting.as_deref()
    }

    pub fn silent_mode(&self) -> bool {
        self.silent_mode
    }

    pub fn alert_status(&self) -> AlertStatus {
        self.alert_status
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            on_call: self.on_call,
            ringer_setting: self.ringer_setting.clone(),
            saved_ringer_setting: self.saved_ringer_setting.clone(),
            silent_mode: self.silent_mode,
            alert_status: self.alert_status.bits(),
        }
    }

    // -----------------------------------------------------------------------
    // Signals
    // -----------------------------------------------------------------------

    /// Handle a call-context `ValueChanged` signal.
    pub async fn call_state_changed(&mut self, records: &[Value]) -> Result<()> {
        for record in records {
            let Some(state) = CallState::from_record(record) else {
                debug!(
                    record = %loggable_record(record),
                    "Ignoring call record without a known state"
                );
                continue;
            };

            match state {
                CallState::Incoming => {
                    self.on_call = true;
                    self.log_call_state(state, record);
                    self.refresh_alert_status().await?;
                }
                CallState::Active if !self.options.end_on_active => {
                    debug!("Ignoring active call state");
                }
                CallState::Active | CallState::Ended => {
                    self.on_call = false;
                    self.log_call_state(state, record);
                    self.refresh_alert_status().await?;
                    if !self.silent_mode {
                        self.restore_ringer().await?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Handle a profile daemon `profile_changed` signal.
    pub async fn profile_changed(&mut self, changes: &[ProfileChange]) -> Result<()> {
        for change in changes {
            if change.key != self.options.ringer_key {
                continue;
            }
            debug!(ringer = %change.value, "Ringer setting reported");

            let differs = self.ringer_setting.as_deref() != Some(change.value.as_str());
            if !differs && !self.silent_mode {
                continue;
            }

            let previous = self.ringer_setting.replace(change.value.clone());
            EventLogger::log_event(
                &self.options.agent_path,
                AgentEvent::RingerChanged {
                    from: previous,
                    to: change.value.clone(),
                    reason: "profile_changed".into(),
                },
            );

            self.notify_ringer_setting(&change.value).await?;

            // In silent mode a user choice replaces the value to restore;
            // our own "Silent" write coming back does not.
            if self.silent_mode && change.value != RINGER_SILENT && !change.value.is_empty() {
                self.saved_ringer_setting = Some(change.value.clone());
            }

            self.refresh_alert_status().await?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Methods
    // -----------------------------------------------------------------------

    /// Dispatch a method call from the agent interface.
    pub async fn handle_command(&mut self, command: Command) -> Result<CommandReply, AgentError> {
        info!(method = %command, "Method call");
        let result = match command {
            Command::MuteOnce => self.mute_once().await.map(|_| CommandReply::Done),
            Command::SetSilentMode => self.set_silent_mode().await.map(|_| CommandReply::Done),
            Command::CancelSilentMode => {
                self.cancel_silent_mode().await.map(|_| CommandReply::Done)
            }
            Command::GetSilentMode => Ok(CommandReply::RingerSetting(self.get_silent_mode())),
            Command::GetAlertStatus => {
                return self.get_alert_status().map(CommandReply::AlertStatus);
            }
        };

        let outcome = match &result {
            Ok(_) => "ok".to_string(),
            Err(e) => format!("error: {e}"),
        };
        EventLogger::log_event(
            &self.options.agent_path,
            AgentEvent::Command {
                method: command.method_name().into(),
                outcome,
            },
        );

        result.map_err(|e| e.downcast::<AgentError>().unwrap_or_else(AgentError::Other))
    }

    /// Silence the ringer for the current call only.
    pub async fn mute_once(&mut self) -> Result<()> {
        if self.silent_mode {
            info!("In Silent mode");
            return Ok(());
        }
        if !self.on_call {
            info!("No active call");
            return Ok(());
        }
        if self.ringer_setting.as_deref() == Some(RINGER_SILENT) {
            info!("Ringer already silent");
            return Ok(());
        }
        self.silence_ringer().await
    }

    /// Silence the ringer until `cancel_silent_mode`.
    pub async fn set_silent_mode(&mut self) -> Result<()> {
        if self.silent_mode {
            return Ok(());
        }
        self.silence_ringer().await?;
        self.silent_mode = true;
        Ok(())
    }

    pub async fn cancel_silent_mode(&mut self) -> Result<()> {
        if !self.silent_mode {
            return Ok(());
        }
        self.silent_mode = false;
        self.restore_ringer().await
    }

    /// Returns the ringer setting, not the silent-mode flag. Empty when unknown.
    pub fn get_silent_mode(&self) -> String {
        self.ringer_setting.clone().unwrap_or_default()
    }

    pub fn get_alert_status(&self) -> Result<u8, AgentError> {
        if !self.options.alert_status {
            return Err(AgentError::UnsupportedMethod(
                Command::GetAlertStatus.method_name().into(),
            ));
        }
        Ok(self.alert_status.bits())
    }

    // -----------------------------------------------------------------------
    // Ringer helpers
    // -----------------------------------------------------------------------

    async fn silence_ringer(&mut self) -> Result<()> {
        info!("Silencing ringer");
        // Keep an earlier save when the ringer is already forced silent.
        match self.ringer_setting.as_deref() {
            Some(RINGER_SILENT) => {}
            Some(current) if !current.is_empty() => {
                self.saved_ringer_setting = Some(current.to_string());
            }
            _ => self.saved_ringer_setting = None,
        }
        self.set_ringer(RINGER_SILENT, "silence").await
    }

    async fn restore_ringer(&mut self) -> Result<()> {
        let Some(saved) = self.saved_ringer_setting.clone() else {
            return Ok(());
        };
        info!(ringer = %saved, "Restoring ringer setting");
        self.set_ringer(&saved, "restore").await?;
        self.saved_ringer_setting = None;
        Ok(())
    }

    async fn set_ringer(&mut self, value: &str, reason: &str) -> Result<()> {
        let previous = self.ringer_setting.replace(value.to_string());
        EventLogger::log_event(
            &self.options.agent_path,
            AgentEvent::RingerChanged {
                from: previous,
                to: value.to_string(),
                reason: reason.to_string(),
            },
        );
        self.profiled
            .set_value(&self.options.ringer_key, value)
            .await
            .map_err(profile_error)?;
        self.refresh_alert_status().await
    }

    // -----------------------------------------------------------------------
    // Peer notifications
    // -----------------------------------------------------------------------

    async fn refresh_alert_status(&mut self) -> Result<()> {
        if !self.options.alert_status {
            return Ok(());
        }

        let old = self.alert_status;
        let ringing = self.on_call && self.ringer_setting.as_deref() != Some(RINGER_SILENT);
        self.alert_status.set(AlertStatus::RINGER_STATE, ringing);

        if old != self.alert_status {
            info!(status = %self.alert_status, "NotifyAlertStatus");
            EventLogger::log_event(
                &self.options.agent_path,
                AgentEvent::Notification {
                    method: "NotifyAlertStatus".into(),
                    argument: self.alert_status.to_string(),
                },
            );
            self.phone
                .notify_alert_status(self.alert_status.bits())
                .await
                .map_err(peer_error)?;
        }
        Ok(())
    }

    async fn notify_ringer_setting(&self, setting: &str) -> Result<()> {
        info!(ringer = %setting, "NotifyRingerSetting");
        EventLogger::log_event(
            &self.options.agent_path,
            AgentEvent::Notification {
                method: "NotifyRingerSetting".into(),
                argument: setting.to_string(),
            },
        );
        self.phone
            .notify_ringer_setting(setting)
            .await
            .map_err(peer_error)?;
        Ok(())
    }

    fn log_call_state(&self, state: CallState, record: &Value) {
        EventLogger::log_event(
            &self.options.agent_path,
            AgentEvent::CallState {
                state: state.to_string(),
                on_call: self.on_call,
                records_json: record.to_string(),
            },
        );
    }
}

/// Call record as logged on tracing targets, with phone numbers scrubbed.
fn loggable_record(record: &Value) -> String {
    redact_sensitive_data(&record.to_string())
}

fn profile_error(e: anyhow::Error) -> anyhow::Error {
    AgentError::ProfileService(format!("{e:#}")).into()
}

fn peer_error(e: anyhow::Error) -> anyhow::Error {
    AgentError::PhoneAlert(format!("{e:#}")).into()
}

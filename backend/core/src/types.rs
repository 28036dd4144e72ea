use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ringer profile value that suppresses the audible alert.
pub const RINGER_SILENT: &str = "Silent";

/// Call state codes published by the call-context service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    /// A call is ringing
    Incoming,
    /// The call was answered
    Active,
    /// The call is over
    Ended,
}

impl CallState {
    pub const INCOMING_CODE: i64 = 0;
    pub const ACTIVE_CODE: i64 = 3;
    pub const ENDED_CODE: i64 = 6;

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            Self::INCOMING_CODE => Some(Self::Incoming),
            Self::ACTIVE_CODE => Some(Self::Active),
            Self::ENDED_CODE => Some(Self::Ended),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Incoming => Self::INCOMING_CODE,
            Self::Active => Self::ACTIVE_CODE,
            Self::Ended => Self::ENDED_CODE,
        }
    }

    /// Extract the call state from one `ValueChanged` record.
    ///
    /// Records are loosely typed dictionaries. Anything that is not an object
    /// with an integer `state` field holding a known code yields `None`.
    pub fn from_record(record: &Value) -> Option<Self> {
        let state = record.as_object()?.get("state")?;
        state.as_i64().and_then(Self::from_code)
    }
}

impl std::fmt::Display for CallState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Incoming => "incoming",
            Self::Active => "active",
            Self::Ended => "ended",
        };
        f.write_str(s)
    }
}

/// One changed (key, value) pair from a `profile_changed` broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct ProfileChange {
    pub key: String,
    pub value: String,
}

impl ProfileChange {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl From<(String, String)> for ProfileChange {
    fn from((key, value): (String, String)) -> Self {
        Self { key, value }
    }
}

impl From<ProfileChange> for (String, String) {
    fn from(change: ProfileChange) -> Self {
        (change.key, change.value)
    }
}

/// Alert status flags reported to the phone-alert peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertStatus(u8);

impl AlertStatus {
    /// The ringer is audible while a call is ringing.
    pub const RINGER_STATE: u8 = 1 << 0;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn set(&mut self, flag: u8, enabled: bool) {
        if enabled {
            self.0 |= flag;
        } else {
            self.0 &= !flag;
        }
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02x}", self.0)
    }
}

/// Methods exposed on the agent's `org.bluez.PhoneAgent` interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MuteOnce,
    SetSilentMode,
    CancelSilentMode,
    GetSilentMode,
    GetAlertStatus,
}

impl Command {
    pub const ALL: [Command; 5] = [
        Command::MuteOnce,
        Command::SetSilentMode,
        Command::CancelSilentMode,
        Command::GetSilentMode,
        Command::GetAlertStatus,
    ];

    /// Interface method name.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::MuteOnce => "MuteOnce",
            Self::SetSilentMode => "SetSilentMode",
            Self::CancelSilentMode => "CancelSilentMode",
            Self::GetSilentMode => "GetSilentMode",
            Self::GetAlertStatus => "GetAlertStatus",
        }
    }

    pub fn from_method_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.method_name() == name)
    }

    /// Map a Ringer Control Point write from the Phone Alert Status service.
    ///
    /// `1` = silent mode, `2` = mute once, `3` = cancel silent mode.
    pub fn from_control_point(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::SetSilentMode),
            2 => Some(Self::MuteOnce),
            3 => Some(Self::CancelSilentMode),
            _ => None,
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.method_name())
    }
}

/// Return value of a method call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CommandReply {
    /// Method with no return value completed
    Done,
    /// `GetSilentMode` result
    RingerSetting(String),
    /// `GetAlertStatus` result
    AlertStatus(u8),
}

/// Ringer Setting characteristic value for a ringer profile name.
///
/// `0` = ringer silent, `1` = ringer normal.
pub fn ringer_characteristic(setting: &str) -> u8 {
    if setting == RINGER_SILENT { 0 } else { 1 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_call_state_from_record() {
        assert_eq!(
            CallState::from_record(&json!({"state": 0})),
            Some(CallState::Incoming)
        );
        assert_eq!(
            CallState::from_record(&json!({"state": 3, "remote": "+15551234567"})),
            Some(CallState::Active)
        );
        assert_eq!(
            CallState::from_record(&json!({"state": 6})),
            Some(CallState::Ended)
        );
    }

    #[test]
    fn test_call_state_ignores_malformed_records() {
        assert_eq!(CallState::from_record(&json!({})), None);
        assert_eq!(CallState::from_record(&json!({"state": 1})), None);
        assert_eq!(CallState::from_record(&json!({"state": "0"})), None);
        assert_eq!(CallState::from_record(&json!([0])), None);
        assert_eq!(CallState::from_record(&json!(0)), None);
        assert_eq!(CallState::from_record(&json!({"state": null})), None);
    }

    #[test]
    fn test_alert_status_flags() {
        let mut status = AlertStatus::default();
        assert!(!status.contains(AlertStatus::RINGER_STATE));
        status.set(AlertStatus::RINGER_STATE, true);
        assert_eq!(status.bits(), 0x01);
        assert_eq!(status.to_string(), "01");
        status.set(AlertStatus::RINGER_STATE, false);
        assert_eq!(status.bits(), 0x00);
    }

    #[test]
    fn test_command_method_names() {
        for command in Command::ALL {
            assert_eq!(Command::from_method_name(command.method_name()), Some(command));
        }
        assert_eq!(Command::from_method_name("Release"), None);
    }

    #[test]
    fn test_control_point_mapping() {
        assert_eq!(Command::from_control_point(1), Some(Command::SetSilentMode));
        assert_eq!(Command::from_control_point(2), Some(Command::MuteOnce));
        assert_eq!(Command::from_control_point(3), Some(Command::CancelSilentMode));
        assert_eq!(Command::from_control_point(0), None);
        assert_eq!(Command::from_control_point(4), None);
    }

    #[test]
    fn test_profile_change_deserializes_from_pair() {
        let change: ProfileChange =
            serde_json::from_value(json!(["ringing.alert.type", "Normal"])).unwrap();
        assert_eq!(change, ProfileChange::new("ringing.alert.type", "Normal"));
    }

    #[test]
    fn test_ringer_characteristic() {
        assert_eq!(ringer_characteristic("Silent"), 0);
        assert_eq!(ringer_characteristic("Normal"), 1);
        assert_eq!(ringer_characteristic("Beep"), 1);
    }
}

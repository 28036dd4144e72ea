//! Scripted bus traffic for `phoneagent run`.
//!
//! A script is a YAML list of steps:
//!
//! ```yaml
//! - call_state: [{state: 0}]
//! - call: MuteOnce
//! - profile_changed: [[ringing.alert.type, Beep]]
//! - control_point: 3
//! - call_state: [{state: 6}]
//! ```
//!
//! On stdin the same steps are read one JSON object per line.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use phoneagent_core::ProfileChange;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Call-context `ValueChanged` records
    CallState(Vec<Value>),
    /// Profile daemon `profile_changed` pairs
    ProfileChanged(Vec<ProfileChange>),
    /// Method on the agent interface, by name
    Call(String),
    /// Ringer Control Point write from the phone peer
    ControlPoint(u8),
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::CallState(records) => {
                write!(f, "call_state {}", Value::Array(records.clone()))
            }
            Step::ProfileChanged(changes) => {
                let pairs: Vec<String> = changes
                    .iter()
                    .map(|c| format!("{}={}", c.key, c.value))
                    .collect();
                write!(f, "profile_changed {}", pairs.join(", "))
            }
            Step::Call(method) => write!(f, "call {method}"),
            Step::ControlPoint(value) => write!(f, "control_point {value}"),
        }
    }
}

/// Parse a YAML script.
///
/// serde_yaml only accepts `!tag` syntax for enum variants, so the document is
/// read as a plain value tree first and steps are decoded from single-key maps.
pub fn parse_script(source: &str) -> Result<Vec<Step>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }
    let tree: Value = serde_yaml::from_str(source).context("Failed to parse script")?;
    let Value::Array(items) = tree else {
        bail!("Script must be a list of steps");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item)
                .with_context(|| format!("Invalid step #{} in script", i + 1))
        })
        .collect()
}

/// Parse one stdin line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Step>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let step = serde_json::from_str(line)
        .with_context(|| format!("Failed to parse step: {line}"))?;
    Ok(Some(step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_yaml_script() {
        let script = r#"
- call_state: [{state: 0, remote: "5551234567"}]
- call: MuteOnce
- profile_changed: [[ringing.alert.type, Beep]]
- control_point: 3
"#;
        let steps = parse_script(script).unwrap();
        assert_eq!(
            steps,
            vec![
                Step::CallState(vec![json!({"state": 0, "remote": "5551234567"})]),
                Step::Call("MuteOnce".into()),
                Step::ProfileChanged(vec![ProfileChange::new("ringing.alert.type", "Beep")]),
                Step::ControlPoint(3),
            ]
        );
    }

    #[test]
    fn parses_block_style_script() {
        let script = r#"
- call_state:
    - state: 0
      remote: "5551234567"
- call: SetSilentMode
- profile_changed:
    - [ringing.alert.type, Silent]
- call_state: [{state: 6}]
"#;
        let steps = parse_script(script).unwrap();
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[1], Step::Call("SetSilentMode".into()));
        assert_eq!(steps[3], Step::CallState(vec![json!({"state": 6})]));
    }

    #[test]
    fn rejects_malformed_scripts() {
        let err = parse_script("call: MuteOnce").unwrap_err();
        assert!(err.to_string().contains("list of steps"));

        let err = parse_script("- call: MuteOnce\n- dial: 5\n").unwrap_err();
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn empty_script_has_no_steps() {
        assert!(parse_script("  \n").unwrap().is_empty());
    }

    #[test]
    fn parses_json_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("# comment").unwrap(), None);
        assert_eq!(
            parse_line(r#"{"call": "GetSilentMode"}"#).unwrap(),
            Some(Step::Call("GetSilentMode".into()))
        );
        assert!(parse_line(r#"{"dial": 1}"#).is_err());
    }

    #[test]
    fn step_display() {
        let step = Step::ProfileChanged(vec![ProfileChange::new("ringing.alert.type", "Silent")]);
        assert_eq!(step.to_string(), "profile_changed ringing.alert.type=Silent");
        assert_eq!(Step::ControlPoint(2).to_string(), "control_point 2");
    }
}

//! In-process stand-ins for the bus collaborators.
//!
//! `LoopbackProfiled` keeps profile values in memory and, once attached to
//! the agent queue, broadcasts `profile_changed` for every write the way the
//! profile daemon does. `RecordingPhoneAlert` keeps every call made to the
//! phone peer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use phoneagent_core::{Message, PhoneAlert, ProfileChange, ProfileService};

pub struct LoopbackProfiled {
    values: RwLock<HashMap<String, String>>,
    writes: AtomicUsize,
    broadcast_tx: Option<mpsc::Sender<Message>>,
}

impl LoopbackProfiled {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
            broadcast_tx: None,
        }
    }

    /// Seed a profile value.
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values
            .get_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Broadcast `profile_changed` onto the given agent queue after each write.
    pub fn attach(mut self, tx: mpsc::Sender<Message>) -> Self {
        self.broadcast_tx = Some(tx);
        self
    }

    pub async fn value(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    /// Number of `set_value` calls served.
    pub fn set_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Default for LoopbackProfiled {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileService for LoopbackProfiled {
    async fn get_value(&self, key: &str) -> Result<String> {
        self.values
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("profile key '{key}' not found"))
    }

    async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(key = %key, value = %value, "Profile value set");

        if let Some(tx) = &self.broadcast_tx {
            // The agent may be the caller; never wait on its own queue.
            let signal = Message::ProfileChanged(vec![ProfileChange::new(key, value)]);
            if let Err(e) = tx.try_send(signal) {
                warn!(error = %e, "Dropped profile_changed broadcast");
            }
        }
        Ok(())
    }
}

/// One call received by the phone peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "argument")]
pub enum PeerCall {
    RegisterAgent(String),
    NotifyRingerSetting(String),
    NotifyAlertStatus(u8),
}

impl std::fmt::Display for PeerCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerCall::RegisterAgent(path) => write!(f, "RegisterAgent({path})"),
            PeerCall::NotifyRingerSetting(s) => write!(f, "NotifyRingerSetting({s})"),
            PeerCall::NotifyAlertStatus(status) => write!(f, "NotifyAlertStatus({status:02x})"),
        }
    }
}

#[derive(Default)]
pub struct RecordingPhoneAlert {
    calls: Mutex<Vec<PeerCall>>,
    failing: AtomicBool,
}

impl RecordingPhoneAlert {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, like a peer that left the bus.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PeerCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn take_calls(&self) -> Vec<PeerCall> {
        self.calls
            .lock()
            .map(|mut c| std::mem::take(&mut *c))
            .unwrap_or_default()
    }

    fn record(&self, call: PeerCall) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            bail!("phone alert peer unavailable: {call}");
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        Ok(())
    }
}

#[async_trait]
impl PhoneAlert for RecordingPhoneAlert {
    async fn register_agent(&self, path: &str) -> Result<()> {
        self.record(PeerCall::RegisterAgent(path.to_string()))
    }

    async fn notify_ringer_setting(&self, setting: &str) -> Result<()> {
        self.record(PeerCall::NotifyRingerSetting(setting.to_string()))
    }

    async fn notify_alert_status(&self, status: u8) -> Result<()> {
        self.record(PeerCall::NotifyAlertStatus(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_profiled_get_and_set() {
        let profiled = LoopbackProfiled::new().with_value("ringing.alert.type", "Normal");
        assert_eq!(profiled.get_value("ringing.alert.type").await.unwrap(), "Normal");
        assert!(profiled.get_value("missing").await.is_err());

        profiled.set_value("ringing.alert.type", "Silent").await.unwrap();
        assert_eq!(profiled.value("ringing.alert.type").await.as_deref(), Some("Silent"));
        assert_eq!(profiled.set_count(), 1);
    }

    #[tokio::test]
    async fn test_profiled_broadcasts_when_attached() {
        let (tx, mut rx) = mpsc::channel(4);
        let profiled = LoopbackProfiled::new().attach(tx);
        profiled.set_value("ringing.alert.type", "Silent").await.unwrap();

        match rx.recv().await.unwrap() {
            Message::ProfileChanged(changes) => {
                assert_eq!(changes, vec![ProfileChange::new("ringing.alert.type", "Silent")]);
            }
            other => panic!("unexpected message {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_profiled_full_queue_does_not_block() {
        let (tx, _rx) = mpsc::channel(1);
        let profiled = LoopbackProfiled::new().attach(tx);
        profiled.set_value("k", "a").await.unwrap();
        profiled.set_value("k", "b").await.unwrap();
        assert_eq!(profiled.value("k").await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_recording_phone_alert() {
        let phone = RecordingPhoneAlert::new();
        phone.register_agent("/test/phoneagent").await.unwrap();
        phone.notify_alert_status(1).await.unwrap();
        assert_eq!(phone.calls().len(), 2);
        assert_eq!(phone.calls()[1].to_string(), "NotifyAlertStatus(01)");

        phone.set_failing(true);
        assert!(phone.notify_ringer_setting("Normal").await.is_err());
        assert_eq!(phone.take_calls().len(), 2);
        assert!(phone.calls().is_empty());
    }
}

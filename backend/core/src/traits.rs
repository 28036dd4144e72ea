use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::message::Message;

/// A long-running bus component.
///
/// The component receives messages from its channel and runs in its own Tokio task.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Human-readable name of this component.
    fn name(&self) -> &str;

    /// Start the component's event loop, consuming from the given receiver.
    async fn start(&self, rx: mpsc::Receiver<Message>) -> Result<()>;
}

/// The ringer-profile service (`com.nokia.profiled`).
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Read a value from the active profile.
    async fn get_value(&self, key: &str) -> Result<String>;

    /// Write a value into the active profile.
    async fn set_value(&self, key: &str, value: &str) -> Result<()>;
}

/// The phone-alert peer (`org.bluez.PhoneAlert`).
#[async_trait]
pub trait PhoneAlert: Send + Sync {
    /// Register the agent object path with the peer.
    async fn register_agent(&self, path: &str) -> Result<()>;

    async fn notify_ringer_setting(&self, setting: &str) -> Result<()>;

    async fn notify_alert_status(&self, status: u8) -> Result<()>;
}

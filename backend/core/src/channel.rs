use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::AgentError;
use crate::message::Message;
use crate::types::{Command, CommandReply, ProfileChange};

/// Default channel buffer size for the agent queue.
pub const DEFAULT_BUFFER_SIZE: usize = 256;

/// The message bus feeding the phone agent.
///
/// Signals and method calls share one queue so the agent sees them in the
/// order they arrived. Built on a bounded Tokio mpsc channel.
pub struct AgentBus {
    pub agent_tx: mpsc::Sender<Message>,
    pub agent_rx: Option<mpsc::Receiver<Message>>,
}

impl AgentBus {
    /// Create a new bus with the default buffer size.
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a new bus with a custom buffer size.
    pub fn with_buffer_size(buffer: usize) -> Self {
        let (agent_tx, agent_rx) = mpsc::channel(buffer);

        info!(buffer_size = buffer, "AgentBus initialized");

        Self {
            agent_tx,
            agent_rx: Some(agent_rx),
        }
    }

    /// Take the agent receiver (can only be called once).
    pub fn take_agent_rx(&mut self) -> Option<mpsc::Receiver<Message>> {
        debug!("Agent receiver taken");
        self.agent_rx.take()
    }

    /// A client handle for emitting signals and calling methods.
    pub fn handle(&self) -> AgentHandle {
        AgentHandle {
            tx: self.agent_tx.clone(),
        }
    }
}

impl Default for AgentBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable client side of the agent bus.
#[derive(Debug, Clone)]
pub struct AgentHandle {
    tx: mpsc::Sender<Message>,
}

impl AgentHandle {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Deliver a call-context `ValueChanged` signal.
    pub async fn call_state_changed(&self, records: Vec<Value>) -> Result<(), AgentError> {
        self.send(Message::CallStateChanged(records)).await
    }

    /// Deliver a `profile_changed` signal.
    pub async fn profile_changed(&self, changes: Vec<ProfileChange>) -> Result<(), AgentError> {
        self.send(Message::ProfileChanged(changes)).await
    }

    /// Invoke a method on the agent and wait for its reply.
    pub async fn call(&self, command: Command) -> Result<CommandReply, AgentError> {
        let (reply, rx) = oneshot::channel();
        self.send(Message::MethodCall { command, reply }).await?;
        rx.await
            .map_err(|_| AgentError::ChannelClosed(format!("no reply to {command}")))?
    }

    /// Wait until the agent has handled everything sent before this call.
    pub async fn flush(&self) -> Result<(), AgentError> {
        let (done, rx) = oneshot::channel();
        self.send(Message::Flush(done)).await?;
        rx.await
            .map_err(|_| AgentError::ChannelClosed("agent stopped before flush".into()))
    }

    /// Ask the agent loop to stop after the queued messages.
    pub async fn shutdown(&self) -> Result<(), AgentError> {
        self.send(Message::Shutdown).await
    }

    async fn send(&self, message: Message) -> Result<(), AgentError> {
        let kind = message.kind();
        self.tx
            .send(message)
            .await
            .map_err(|_| AgentError::ChannelClosed(format!("agent queue closed ({kind})")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_bus_send_receive() {
        let mut bus = AgentBus::new();
        let mut rx = bus.take_agent_rx().unwrap();

        bus.handle()
            .call_state_changed(vec![json!({"state": 0})])
            .await
            .unwrap();
        let received = rx.recv().await.unwrap();
        assert_eq!(received.kind(), "call_state_changed");
    }

    #[tokio::test]
    async fn test_bus_take_rx_once() {
        let mut bus = AgentBus::new();
        assert!(bus.take_agent_rx().is_some());
        assert!(bus.take_agent_rx().is_none());
    }

    #[tokio::test]
    async fn test_bus_preserves_order() {
        let mut bus = AgentBus::new();
        let mut rx = bus.take_agent_rx().unwrap();
        let handle = bus.handle();

        handle.call_state_changed(vec![]).await.unwrap();
        handle
            .profile_changed(vec![ProfileChange::new("ringing.alert.type", "Silent")])
            .await
            .unwrap();
        handle.shutdown().await.unwrap();

        assert_eq!(rx.recv().await.unwrap().kind(), "call_state_changed");
        assert_eq!(rx.recv().await.unwrap().kind(), "profile_changed");
        assert_eq!(rx.recv().await.unwrap().kind(), "shutdown");
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let mut bus = AgentBus::new();
        let mut rx = bus.take_agent_rx().unwrap();
        let handle = bus.handle();

        let responder = tokio::spawn(async move {
            if let Some(Message::MethodCall { command, reply }) = rx.recv().await {
                assert_eq!(command, Command::GetSilentMode);
                let _ = reply.send(Ok(CommandReply::RingerSetting("Normal".into())));
            }
        });

        let reply = handle.call(Command::GetSilentMode).await.unwrap();
        assert_eq!(reply, CommandReply::RingerSetting("Normal".into()));
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_flush_waits_for_agent() {
        let mut bus = AgentBus::new();
        let mut rx = bus.take_agent_rx().unwrap();
        let handle = bus.handle();

        let responder = tokio::spawn(async move {
            assert_eq!(rx.recv().await.unwrap().kind(), "call_state_changed");
            match rx.recv().await.unwrap() {
                Message::Flush(done) => done.send(()).unwrap(),
                other => panic!("unexpected message {}", other.kind()),
            }
        });

        handle.call_state_changed(vec![]).await.unwrap();
        handle.flush().await.unwrap();
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn test_call_fails_when_agent_gone() {
        let mut bus = AgentBus::new();
        drop(bus.take_agent_rx());

        let err = bus.handle().call(Command::MuteOnce).await.unwrap_err();
        assert!(matches!(err, AgentError::ChannelClosed(_)));
    }

    #[tokio::test]
    async fn test_bus_backpressure() {
        let mut bus = AgentBus::with_buffer_size(2);
        let _rx = bus.take_agent_rx().unwrap();

        for _ in 0..2 {
            bus.agent_tx.send(Message::Shutdown).await.unwrap();
        }

        // Third send should not complete immediately (buffer full)
        assert!(bus.agent_tx.try_send(Message::Shutdown).is_err());
    }
}

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::AgentError;
use crate::types::{Command, CommandReply, ProfileChange};

/// Reply channel for a method call.
pub type ReplySender = oneshot::Sender<Result<CommandReply, AgentError>>;

/// Everything the agent receives from the bus, in arrival order.
#[derive(Debug)]
pub enum Message {
    /// Call-context `ValueChanged` signal. Records are validated by the agent.
    CallStateChanged(Vec<Value>),
    /// Profile daemon `profile_changed` signal
    ProfileChanged(Vec<ProfileChange>),
    /// Inbound call on the agent interface
    MethodCall {
        command: Command,
        reply: ReplySender,
    },
    /// Answered once every earlier message has been handled
    Flush(oneshot::Sender<()>),
    /// Stop the dispatch loop
    Shutdown,
}

impl Message {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::CallStateChanged(_) => "call_state_changed",
            Message::ProfileChanged(_) => "profile_changed",
            Message::MethodCall { .. } => "method_call",
            Message::Flush(_) => "flush",
            Message::Shutdown => "shutdown",
        }
    }
}

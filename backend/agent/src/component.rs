//! Dispatch loop for the phone agent.
//!
//! Drains the agent queue one message at a time and hands each to the
//! controller. A failed handler is logged and the loop moves on.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use phoneagent_core::{Component, Message};
use phoneagent_logging::{AgentEvent, EventLogger};

use crate::controller::{ControllerSnapshot, RingerSilenceController};

pub struct PhoneAgent {
    controller: Mutex<RingerSilenceController>,
}

impl PhoneAgent {
    pub fn new(controller: RingerSilenceController) -> Self {
        Self {
            controller: Mutex::new(controller),
        }
    }

    /// Controller state between messages.
    pub async fn snapshot(&self) -> ControllerSnapshot {
        self.controller.lock().await.snapshot()
    }
}

#[async_trait]
impl Component for PhoneAgent {
    fn name(&self) -> &str {
        "phone_agent"
    }

    async fn start(&self, mut rx: mpsc::Receiver<Message>) -> Result<()> {
        let agent_path = {
            let mut controller = self.controller.lock().await;
            controller.initialize().await?;
            controller.options().agent_path.clone()
        };
        info!(path = %agent_path, "Phone agent started");

        while let Some(message) = rx.recv().await {
            debug!(kind = message.kind(), "Dispatching message");
            let mut controller = self.controller.lock().await;

            let outcome = match message {
                Message::CallStateChanged(records) => {
                    controller.call_state_changed(&records).await
                }
                Message::ProfileChanged(changes) => controller.profile_changed(&changes).await,
                Message::MethodCall { command, reply } => {
                    let result = controller.handle_command(command).await;
                    if let Err(e) = &result {
                        warn!(method = %command, error = %e, "Method call failed");
                    }
                    if reply.send(result).is_err() {
                        debug!(method = %command, "Caller went away before the reply");
                    }
                    Ok(())
                }
                Message::Flush(done) => {
                    let _ = done.send(());
                    Ok(())
                }
                Message::Shutdown => {
                    info!("Phone agent shutting down");
                    break;
                }
            };

            if let Err(e) = outcome {
                error!(error = %e, "Signal handler failed");
                EventLogger::log_event(
                    &agent_path,
                    AgentEvent::Error {
                        error_msg: format!("{e:#}"),
                    },
                );
            }
        }

        info!(path = %agent_path, "Phone agent stopped");
        Ok(())
    }
}

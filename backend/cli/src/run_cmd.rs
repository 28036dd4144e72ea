//! `phoneagent run`: start the agent against in-process collaborators and
//! replay scripted bus traffic.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use phoneagent_agent::{
    ControllerOptions, ControllerSnapshot, LoopbackProfiled, PhoneAgent, RecordingPhoneAlert,
    RingerSilenceController,
};
use phoneagent_config::AgentConfig;
use phoneagent_core::{
    ringer_characteristic, AgentBus, AgentHandle, Command, CommandReply, Component,
};

use crate::script::{parse_line, parse_script, Step};
use crate::terminal_output::{note, render_table, Column, Tone};

pub struct RunOptions {
    /// YAML script; steps are read from stdin when absent
    pub script: Option<PathBuf>,
    /// Ringer value the loopback profile service starts with
    pub ringer: String,
}

/// Replay the steps and return the agent state after shutdown.
pub async fn run(config: AgentConfig, options: RunOptions) -> Result<ControllerSnapshot> {
    info!(
        path = %config.agent_path(),
        interface = %config.agent_interface(),
        peer = %format!("{}{}", config.phone_alert_service(), config.phone_alert_path()),
        profiled = %config.profile_service(),
        call_context = %config.call_context_service(),
        alert_status = config.alert_status_enabled(),
        end_on_active = config.end_on_active(),
        "Starting phone agent"
    );

    let mut bus = AgentBus::with_buffer_size(config.buffer_size());
    let rx = bus
        .take_agent_rx()
        .context("agent receiver already taken")?;

    let profiled = Arc::new(
        LoopbackProfiled::new()
            .with_value(config.ringer_key(), &options.ringer)
            .attach(bus.agent_tx.clone()),
    );
    let phone = Arc::new(RecordingPhoneAlert::new());

    let controller = RingerSilenceController::new(
        ControllerOptions::from_config(&config),
        profiled,
        phone.clone(),
    );
    let agent = Arc::new(PhoneAgent::new(controller));

    let runner = Arc::clone(&agent);
    let task = tokio::spawn(async move {
        let result = runner.start(rx).await;
        if let Err(e) = &result {
            error!(error = %e, "Phone agent task failed");
        }
        result
    });

    let handle = bus.handle();
    let mut index = 0usize;

    match &options.script {
        Some(path) => {
            let source = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read script: {}", path.display()))?;
            for step in parse_script(&source)? {
                index += 1;
                execute_step(&handle, index, &step).await?;
                print_peer_calls(&phone);
            }
        }
        None => {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let step = match parse_line(&line) {
                    Ok(Some(step)) => step,
                    Ok(None) => continue,
                    Err(e) => {
                        note(Tone::Error, &format!("{e:#}"));
                        continue;
                    }
                };
                index += 1;
                execute_step(&handle, index, &step).await?;
                print_peer_calls(&phone);
            }
        }
    }

    handle.shutdown().await?;
    task.await.context("phone agent task panicked")??;
    print_peer_calls(&phone);

    let snapshot = agent.snapshot().await;
    let ringer = snapshot.ringer_setting.clone().unwrap_or_default();
    let rows = vec![
        vec!["on_call".to_string(), snapshot.on_call.to_string()],
        vec!["ringer_setting".to_string(), ringer.clone()],
        vec![
            "ringer_characteristic".to_string(),
            ringer_characteristic(&ringer).to_string(),
        ],
        vec![
            "saved_ringer_setting".to_string(),
            snapshot.saved_ringer_setting.clone().unwrap_or_else(|| "-".into()),
        ],
        vec!["silent_mode".to_string(), snapshot.silent_mode.to_string()],
        vec![
            "alert_status".to_string(),
            format!("{:02x}", snapshot.alert_status),
        ],
    ];
    println!();
    print!(
        "{}",
        render_table(&[Column::left("state"), Column::right("value")], &rows)
    );
    Ok(snapshot)
}

/// Deliver one step and wait until the agent has handled it.
///
/// Method-call failures are printed and the run continues; a closed bus ends it.
async fn execute_step(handle: &AgentHandle, index: usize, step: &Step) -> Result<()> {
    note(Tone::Step(index), &step.to_string());
    match step {
        Step::CallState(records) => handle.call_state_changed(records.clone()).await?,
        Step::ProfileChanged(changes) => handle.profile_changed(changes.clone()).await?,
        Step::Call(method) => match Command::from_method_name(method) {
            Some(command) => invoke(handle, command).await,
            None => note(Tone::Error, &format!("Unknown method '{method}'")),
        },
        Step::ControlPoint(value) => match Command::from_control_point(*value) {
            Some(command) => invoke(handle, command).await,
            None => note(Tone::Warn, &format!("Ignoring control point value {value}")),
        },
    }
    handle.flush().await?;
    Ok(())
}

async fn invoke(handle: &AgentHandle, command: Command) {
    match handle.call(command).await {
        Ok(CommandReply::Done) => note(Tone::Success, &format!("{command}()")),
        Ok(CommandReply::RingerSetting(s)) => {
            note(Tone::Success, &format!("{command}() = \"{s}\""))
        }
        Ok(CommandReply::AlertStatus(status)) => {
            note(Tone::Success, &format!("{command}() = {status:02x}"))
        }
        Err(e) => note(Tone::Error, &format!("{command}() failed: {e}")),
    }
}

fn print_peer_calls(phone: &RecordingPhoneAlert) {
    for call in phone.take_calls() {
        note(Tone::Peer, &call.to_string());
    }
}

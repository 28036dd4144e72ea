mod config_cmd;
mod run_cmd;
mod script;
mod terminal_output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use phoneagent_config::{
    config_dir, config_file_path, load_and_prepare, load_config, prepare, AgentConfig,
    FeaturesConfig,
};
use phoneagent_logging::init_logger;

use run_cmd::RunOptions;

#[derive(Parser)]
#[command(name = "phoneagent")]
#[command(about = "Phone agent: silences the ringer on request and restores it when the call ends")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.phoneagent/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent and replay bus traffic from a script or stdin
    Run {
        /// YAML script of steps; reads JSON lines from stdin when omitted
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Initial ringer value held by the profile service
        #[arg(long, default_value = "Normal")]
        ringer: String,
        /// Disable alert status and end silencing only on disconnect
        #[arg(long)]
        legacy: bool,
    },
    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a config file populated with defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective config
    Show,
    /// Check the config file and report problems
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_file_path(&config_dir()));

    init_logging(&path).await;

    match cli.command {
        Commands::Run {
            script,
            ringer,
            legacy,
        } => {
            let mut config = load_and_prepare(&path).await?;
            if legacy {
                config.features = Some(FeaturesConfig::legacy());
            }
            run_cmd::run(config, RunOptions { script, ringer }).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => config_cmd::init(&path, force).await?,
            ConfigAction::Show => config_cmd::show(&path).await?,
            ConfigAction::Validate => config_cmd::validate(&path).await?,
        },
    }

    Ok(())
}

/// Install the logger from whatever the config file says, before it is validated.
async fn init_logging(path: &Path) {
    let config = match load_config(path).await {
        Ok(raw) => prepare(raw).unwrap_or_default(),
        Err(_) => AgentConfig::default(),
    };
    init_logger(
        config.log_dir().map(Path::new),
        config.log_level(),
        config.log_json(),
    );
}

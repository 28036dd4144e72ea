//! `phoneagent config`: init, show and validate the config file.

use std::path::Path;

use anyhow::{bail, Context, Result};

use phoneagent_config::{
    apply_all_defaults, load_config, prepare, validate as validate_config, write_config,
    AgentConfig,
};

use crate::terminal_output::{note, Tone};

pub async fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    write_config(&apply_all_defaults(AgentConfig::default()), path).await?;
    note(Tone::Success, &format!("Wrote {}", path.display()));
    Ok(())
}

pub async fn show(path: &Path) -> Result<()> {
    let config = prepare(load_config(path).await?)?;
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize config")?;
    print!("{yaml}");
    Ok(())
}

pub async fn validate(path: &Path) -> Result<()> {
    let config = prepare(load_config(path).await?)?;
    let report = validate_config(&config);

    for warning in &report.warnings {
        note(Tone::Warn, &format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note(Tone::Error, &format!("{}: {}", error.path, error.message));
    }

    if !report.is_valid() {
        bail!("{} config error(s) in {}", report.errors.len(), path.display());
    }
    note(Tone::Success, &format!("{} is valid", path.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_substitutes_env_vars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "bus:\n  agentPath: /test/${PHONEAGENT_VALIDATE_AGENT}\n")
            .await
            .unwrap();
        std::env::set_var("PHONEAGENT_VALIDATE_AGENT", "hall");

        validate(&path).await.unwrap();
        show(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_validate_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        tokio::fs::write(&path, "bus:\n  bufferSize: 0\n").await.unwrap();

        let err = validate(&path).await.unwrap_err();
        assert!(err.to_string().contains("1 config error"));
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        init(&path, false).await.unwrap();
        assert!(init(&path, false).await.is_err());
        init(&path, true).await.unwrap();
        validate(&path).await.unwrap();
    }
}

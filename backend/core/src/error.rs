use thiserror::Error;

/// Top-level error type for the phone agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("profile service error: {0}")]
    ProfileService(String),

    #[error("phone alert peer error: {0}")]
    PhoneAlert(String),

    #[error("method not supported: {0}")]
    UnsupportedMethod(String),

    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no MIDI input ports found")]
    NoPorts,

    #[error("invalid port number {index}: {count} port(s) available")]
    InvalidPort { index: usize, count: usize },

    #[error("invalid port selection '{0}'")]
    InvalidSelection(String),

    #[error("failed to initialise MIDI input: {0}")]
    MidiInit(#[from] midir::InitError),

    #[error("failed to open MIDI port: {0}")]
    Connect(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid mapping for note '{note}': {reason}")]
    InvalidMapping { note: String, reason: String },

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("port prompt task failed: {0}")]
    PromptTask(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

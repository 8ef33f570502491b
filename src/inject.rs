use async_trait::async_trait;
use tokio::process::Command;
use tracing::trace;

use crate::config::InjectorConfig;

/// Synthesizes a keypress on whatever window currently holds focus.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyInjector: Send + Sync {
    async fn press(&self, key: &str);
}

/// Shells out to a key-simulation tool, `xdotool key <name>` by default.
#[derive(Debug, Clone)]
pub struct CommandInjector {
    program: String,
    args: Vec<String>,
}

impl CommandInjector {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &InjectorConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    fn command(&self, key: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(key);
        command
    }
}

#[async_trait]
impl KeyInjector for CommandInjector {
    /// Fire-and-forget: neither spawn errors nor the exit status are
    /// inspected, and there is no retry or timeout.
    async fn press(&self, key: &str) {
        trace!("{} {} {}", self.program, self.args.join(" "), key);
        let _ = self.command(key).status().await;
    }
}

pub mod app;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod inject;
pub mod keymap;
pub mod midi;
pub mod selector;

pub use app::{listen, App, Phase};
pub use cli::Cli;
pub use config::AppConfig;
pub use dispatcher::{Dispatch, NoteDispatcher};
pub use error::{AppError, Result};
pub use inject::{CommandInjector, KeyInjector};
pub use keymap::KeyMap;

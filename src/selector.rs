use dialoguer::{theme::ColorfulTheme, Input};

use crate::error::{AppError, Result};

/// Choose a port index out of `ports`.
///
/// With no ports this fails before `prompt` is ever called. A single port is
/// picked automatically; with several, `preset` wins over asking the user.
/// Whatever index is chosen must lie in `[0, ports.len())`.
pub fn select_port<F>(ports: &[String], preset: Option<usize>, prompt: F) -> Result<usize>
where
    F: FnOnce() -> Result<String>,
{
    let count = ports.len();
    if count == 0 {
        return Err(AppError::NoPorts);
    }

    let index = match preset {
        Some(index) => index,
        None if !needs_prompt(count, preset) => 0,
        None => parse_index(&prompt()?)?,
    };

    if index >= count {
        return Err(AppError::InvalidPort { index, count });
    }

    Ok(index)
}

/// Whether choosing among `count` ports requires asking the user
pub fn needs_prompt(count: usize, preset: Option<usize>) -> bool {
    count > 1 && preset.is_none()
}

fn parse_index(answer: &str) -> Result<usize> {
    let answer = answer.trim();
    answer
        .parse()
        .map_err(|_| AppError::InvalidSelection(answer.to_string()))
}

/// Ask on the terminal for a port number
pub fn prompt_port_number() -> Result<String> {
    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Select MIDI port number")
        .interact_text()?;
    Ok(answer)
}

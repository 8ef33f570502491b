use std::collections::BTreeMap;

use crate::error::{AppError, Result};

/// Lowest note in the built-in layout (C2).
pub const LOWEST_NOTE: u8 = 36;
/// Highest note in the built-in layout (D7).
pub const HIGHEST_NOTE: u8 = 98;

pub struct KeyMapping {
    pub note: u8,
    pub key: &'static str,
}

// White keys are plain keys, black keys are shifted keys or named symbols
pub const DEFAULT_MAPPINGS: &[KeyMapping] = &[
    KeyMapping { note: 36, key: "1" },
    KeyMapping { note: 37, key: "exclam" },
    KeyMapping { note: 38, key: "2" },
    KeyMapping { note: 39, key: "at" },
    KeyMapping { note: 40, key: "3" },
    KeyMapping { note: 41, key: "4" },
    KeyMapping { note: 42, key: "numbersign" },
    KeyMapping { note: 43, key: "5" },
    KeyMapping { note: 44, key: "percent" },
    KeyMapping { note: 45, key: "6" },
    KeyMapping { note: 46, key: "asciicircum" },
    KeyMapping { note: 47, key: "7" },
    KeyMapping { note: 48, key: "8" },
    KeyMapping { note: 49, key: "asterisk" },
    KeyMapping { note: 50, key: "9" },
    KeyMapping { note: 51, key: "parenleft" },
    KeyMapping { note: 52, key: "0" },
    KeyMapping { note: 53, key: "q" },
    KeyMapping { note: 54, key: "shift+q" },
    KeyMapping { note: 55, key: "w" },
    KeyMapping { note: 56, key: "shift+w" },
    KeyMapping { note: 57, key: "e" },
    KeyMapping { note: 58, key: "shift+e" },
    KeyMapping { note: 59, key: "r" },
    KeyMapping { note: 60, key: "t" },
    KeyMapping { note: 61, key: "shift+t" },
    KeyMapping { note: 62, key: "y" },
    KeyMapping { note: 63, key: "shift+y" },
    KeyMapping { note: 64, key: "u" },
    KeyMapping { note: 65, key: "i" },
    KeyMapping { note: 66, key: "shift+i" },
    KeyMapping { note: 67, key: "o" },
    KeyMapping { note: 68, key: "shift+o" },
    KeyMapping { note: 69, key: "p" },
    KeyMapping { note: 70, key: "shift+p" },
    KeyMapping { note: 71, key: "a" },
    KeyMapping { note: 72, key: "s" },
    KeyMapping { note: 73, key: "shift+s" },
    KeyMapping { note: 74, key: "d" },
    KeyMapping { note: 75, key: "shift+d" },
    KeyMapping { note: 76, key: "f" },
    KeyMapping { note: 77, key: "g" },
    KeyMapping { note: 78, key: "shift+g" },
    KeyMapping { note: 79, key: "h" },
    KeyMapping { note: 80, key: "shift+h" },
    KeyMapping { note: 81, key: "j" },
    KeyMapping { note: 82, key: "shift+j" },
    KeyMapping { note: 83, key: "k" },
    KeyMapping { note: 84, key: "l" },
    KeyMapping { note: 85, key: "shift+l" },
    KeyMapping { note: 86, key: "z" },
    KeyMapping { note: 87, key: "shift+z" },
    KeyMapping { note: 88, key: "x" },
    KeyMapping { note: 89, key: "c" },
    KeyMapping { note: 90, key: "shift+c" },
    KeyMapping { note: 91, key: "v" },
    KeyMapping { note: 92, key: "shift+v" },
    KeyMapping { note: 93, key: "b" },
    KeyMapping { note: 94, key: "shift+b" },
    KeyMapping { note: 95, key: "n" },
    KeyMapping { note: 96, key: "m" },
    KeyMapping { note: 97, key: "shift+m" },
    KeyMapping { note: 98, key: "parenright" },
];

/// Immutable note number -> key name table, built once at startup.
#[derive(Debug, Clone)]
pub struct KeyMap {
    keys: BTreeMap<u8, String>,
}

impl KeyMap {
    /// The built-in two and a half octave layout.
    pub fn new() -> Self {
        let keys = DEFAULT_MAPPINGS
            .iter()
            .map(|m| (m.note, m.key.to_string()))
            .collect();
        Self { keys }
    }

    /// The built-in layout with entries replaced or added from `overrides`.
    ///
    /// Override keys are note numbers written as strings (as they arrive from
    /// TOML tables and environment variables) and must parse into 0..=127.
    pub fn with_overrides<'a, I>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut map = Self::new();

        for (note, key) in overrides {
            let number: u8 = note.trim().parse().map_err(|_| AppError::InvalidMapping {
                note: note.clone(),
                reason: "note must be a number".to_string(),
            })?;
            if number > 127 {
                return Err(AppError::InvalidMapping {
                    note: note.clone(),
                    reason: "note must be in 0..=127".to_string(),
                });
            }
            let key = key.trim();
            if key.is_empty() {
                return Err(AppError::InvalidMapping {
                    note: note.clone(),
                    reason: "key name is empty".to_string(),
                });
            }
            map.keys.insert(number, key.to_string());
        }

        Ok(map)
    }

    pub fn lookup(&self, note: u8) -> Option<&str> {
        self.keys.get(&note).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Entries in ascending note order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.keys.iter().map(|(note, key)| (*note, key.as_str()))
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new()
    }
}

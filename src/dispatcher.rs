use tracing::{info, trace};

use crate::inject::KeyInjector;
use crate::keymap::KeyMap;
use crate::midi::NoteOn;

/// What the dispatcher did with one incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a note-on with velocity > 0 (or too short to tell)
    Ignored,
    /// Note-on for a note with no key assigned
    Unmapped { note: u8 },
    /// Key injection was requested
    Sent { note: u8, key: String },
}

/// Turns note-on messages into keypresses.
pub struct NoteDispatcher<K> {
    keymap: KeyMap,
    injector: K,
}

impl<K: KeyInjector> NoteDispatcher<K> {
    pub fn new(keymap: KeyMap, injector: K) -> Self {
        Self { keymap, injector }
    }

    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    /// Handle one raw message. Never fails: anything that is not a mapped
    /// note-on is logged at most and otherwise dropped.
    pub async fn handle(&self, message: &[u8]) -> Dispatch {
        let Some(note_on) = NoteOn::parse(message) else {
            trace!("Ignoring MIDI message {:02X?}", message);
            return Dispatch::Ignored;
        };

        match self.keymap.lookup(note_on.note) {
            Some(key) => {
                info!("MIDI note {} -> key '{}'", note_on.note, key);
                self.injector.press(key).await;
                Dispatch::Sent {
                    note: note_on.note,
                    key: key.to_string(),
                }
            }
            None => {
                info!("MIDI note {} (not mapped)", note_on.note);
                Dispatch::Unmapped { note: note_on.note }
            }
        }
    }
}

/// Status nibble for a Note On message
pub const NOTE_ON: u8 = 0x90;

/// A note-on with non-zero velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteOn {
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
}

impl NoteOn {
    /// Decode a raw message. Anything that is not a 3+ byte note-on with
    /// velocity > 0 yields `None`; a velocity-0 note-on is not treated as note-off.
    pub fn parse(message: &[u8]) -> Option<Self> {
        let [status, note, velocity, ..] = *message else {
            return None;
        };

        if status & 0xF0 != NOTE_ON || velocity == 0 {
            return None;
        }

        Some(Self {
            channel: status & 0x0F,
            note,
            velocity,
        })
    }
}

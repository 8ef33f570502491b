pub mod input;
pub mod message;

pub use input::{MidiConnection, MidiListener, PortConnection, PortSource, RawMessage};
pub use message::{NoteOn, NOTE_ON};

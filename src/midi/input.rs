use midir::{Ignore, MidiInput, MidiInputConnection};
use tokio::sync::mpsc::{error::TrySendError, Sender};
use tracing::{debug, trace, warn};

use crate::error::{AppError, Result};

/// Raw MIDI message as delivered by the device subsystem
pub type RawMessage = Vec<u8>;

/// Something that can enumerate MIDI input ports and open one of them.
pub trait PortSource {
    type Connection: PortConnection;

    /// One name per port index
    fn port_names(&self) -> Vec<String>;

    /// Open the port at `index` and forward every message into `sender`
    fn connect(self, index: usize, sender: Sender<RawMessage>) -> Result<Self::Connection>;
}

/// An open input port. Closing (or dropping) it releases the port.
pub trait PortConnection {
    fn name(&self) -> &str;
    fn close(self);
}

/// Handles MIDI input port discovery and connection
pub struct MidiListener {
    midi_in: MidiInput,
}

impl MidiListener {
    /// Create the input client. No message types are filtered out.
    pub fn new(client_name: &str) -> Result<Self> {
        let mut midi_in = MidiInput::new(client_name)?;
        midi_in.ignore(Ignore::None);
        Ok(Self { midi_in })
    }
}

impl PortSource for MidiListener {
    type Connection = MidiConnection;

    fn port_names(&self) -> Vec<String> {
        self.midi_in
            .ports()
            .iter()
            .map(|p| {
                self.midi_in
                    .port_name(p)
                    .unwrap_or_else(|_| "<unknown>".to_string())
            })
            .collect()
    }

    /// The callback runs on the device subsystem's own thread: it only copies
    /// the bytes and hands them over with `try_send`, dropping the message if
    /// the queue is full.
    fn connect(self, index: usize, sender: Sender<RawMessage>) -> Result<MidiConnection> {
        let ports = self.midi_in.ports();
        let port = ports.get(index).ok_or(AppError::InvalidPort {
            index,
            count: ports.len(),
        })?;
        let name = self
            .midi_in
            .port_name(port)
            .unwrap_or_else(|_| "<unknown>".to_string());

        let connection = self
            .midi_in
            .connect(
                port,
                "midi2qwerty-in",
                |stamp, message, tx: &mut Sender<RawMessage>| {
                    trace!(stamp, ?message, "MIDI message received");
                    match tx.try_send(message.to_vec()) {
                        Ok(()) => {}
                        Err(TrySendError::Full(_)) => {
                            warn!("MIDI queue full, dropping message {:02X?}", message)
                        }
                        Err(TrySendError::Closed(_)) => {
                            trace!("MIDI queue closed, discarding message")
                        }
                    }
                },
                sender,
            )
            .map_err(|e| AppError::Connect(e.to_string()))?;

        debug!("Connected to MIDI input port {} ({})", index, name);

        Ok(MidiConnection { connection, name })
    }
}

pub struct MidiConnection {
    connection: MidiInputConnection<Sender<RawMessage>>,
    name: String,
}

impl PortConnection for MidiConnection {
    fn name(&self) -> &str {
        &self.name
    }

    /// Release the port and drop the sending half of the queue
    fn close(self) {
        let (_midi_in, _sender) = self.connection.close();
        debug!("Closed MIDI input port {}", self.name);
    }
}

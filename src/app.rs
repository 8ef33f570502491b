use std::future::Future;

use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, info};

use crate::cli::Cli;
use crate::config::AppConfig;
use crate::dispatcher::NoteDispatcher;
use crate::error::{AppError, Result};
use crate::inject::{CommandInjector, KeyInjector};
use crate::keymap::{KeyMap, HIGHEST_NOTE, LOWEST_NOTE};
use crate::midi::{MidiListener, PortConnection, PortSource, RawMessage};
use crate::selector::{needs_prompt, prompt_port_number, select_port};

/// Process lifecycle. `ShuttingDown` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    SelectingPort,
    Listening,
    ShuttingDown,
}

pub struct App {
    config: AppConfig,
    cli: Cli,
    history: Vec<Phase>,
}

impl App {
    pub fn new(config: AppConfig, cli: Cli) -> Self {
        Self {
            config,
            cli,
            history: vec![Phase::Starting],
        }
    }

    pub fn phase(&self) -> Phase {
        self.history.last().copied().unwrap_or(Phase::Starting)
    }

    /// Every phase entered so far, oldest first
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    fn enter(&mut self, phase: Phase) {
        debug!("{:?} -> {:?}", self.phase(), phase);
        self.history.push(phase);
    }

    /// Run against the real MIDI subsystem, the configured key tool and Ctrl-C.
    pub async fn run(mut self) -> Result<()> {
        let shutdown = shutdown_signal()?;

        if self.cli.mappings {
            print_mappings(&self.config.keymap()?);
            return Ok(());
        }

        print_banner();

        let listener = MidiListener::new(&self.config.client_name)?;
        let injector = CommandInjector::from_config(&self.config.injector);
        self.run_with(listener, injector, prompt_port_number, shutdown)
            .await
    }

    /// The whole lifecycle from port selection to shutdown. `prompt` is only
    /// called when several ports exist and none was preselected; it runs on a
    /// blocking thread so `shutdown` can still interrupt it.
    pub async fn run_with<P, K, F, S>(
        &mut self,
        source: P,
        injector: K,
        prompt: F,
        shutdown: S,
    ) -> Result<()>
    where
        P: PortSource,
        K: KeyInjector,
        F: FnOnce() -> Result<String> + Send + 'static,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let keymap = self.config.keymap()?;

        self.enter(Phase::SelectingPort);
        let ports = source.port_names();

        println!("Available MIDI input ports:");
        if ports.is_empty() {
            println!("  No MIDI input ports found!");
            println!("\nPlease connect a MIDI device and try again.");
            return Err(AppError::NoPorts);
        }
        for (i, name) in ports.iter().enumerate() {
            println!("  [{}] {}", i, name);
        }
        if self.cli.list {
            return Ok(());
        }

        let preset = self.cli.port;
        let answer = if needs_prompt(ports.len(), preset) {
            let prompting = tokio::task::spawn_blocking(prompt);
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    self.enter(Phase::ShuttingDown);
                    return Ok(());
                }
                answer = prompting => Some(answer??),
            }
        } else {
            None
        };
        let index = select_port(&ports, preset, move || Ok(answer.unwrap_or_default()))?;
        if ports.len() == 1 {
            println!("\nUsing MIDI port: {}", ports[0]);
        }

        let (tx, mut rx) = mpsc::channel(self.config.queue_capacity);
        let connection = source.connect(index, tx)?;
        let dispatcher = NoteDispatcher::new(keymap, injector);

        println!("\nOpening MIDI port: {}", connection.name());
        println!("Ready! Play MIDI notes to generate keypresses.");
        println!("Press Ctrl+C to exit.\n");

        let delay = self.config.startup_delay();
        let interrupted = if self.cli.no_delay || delay.is_zero() {
            false
        } else {
            println!("Switching to target window in {} seconds...", delay.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(delay) => false,
                _ = &mut shutdown => true,
            }
        };

        if !interrupted {
            // Notes played while the user was switching windows are not replayed
            let mut discarded = 0;
            while rx.try_recv().is_ok() {
                discarded += 1;
            }
            if discarded > 0 {
                debug!("Discarded {} MIDI message(s) received during startup", discarded);
            }

            self.enter(Phase::Listening);
            println!("Listening for MIDI input...\n");
            let handled = listen(rx, &dispatcher, &mut shutdown).await;
            info!("Handled {} MIDI message(s)", handled);
        }

        self.enter(Phase::ShuttingDown);
        connection.close();
        println!("\nExiting MIDI to QWERTY translator.");
        Ok(())
    }
}

/// Drain `rx` into the dispatcher until `shutdown` resolves or every sender
/// is gone. Returns how many messages were handled.
///
/// `shutdown` is also raced against each dispatch, so a key tool that never
/// exits cannot hold the loop open.
pub async fn listen<K, S>(
    mut rx: Receiver<RawMessage>,
    dispatcher: &NoteDispatcher<K>,
    shutdown: S,
) -> usize
where
    K: KeyInjector,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut handled = 0;

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            message = rx.recv() => match message {
                Some(message) => tokio::select! {
                    biased;
                    _ = &mut shutdown => break,
                    _ = dispatcher.handle(&message) => handled += 1,
                },
                None => {
                    debug!("MIDI input closed");
                    break;
                }
            },
        }
    }

    handled
}

/// Install the interrupt handler immediately, so Ctrl-C is caught from here on
/// (including during the port prompt) rather than from the first poll.
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    #[cfg(unix)]
    let mut interrupt =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    Ok(async move {
        #[cfg(unix)]
        interrupt.recv().await;
        #[cfg(not(unix))]
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        println!("\nInterrupt signal received. Exiting...");
    })
}

fn print_banner() {
    println!("=== MIDI to QWERTY Translator ===");
    println!("Translates MIDI notes to keyboard keypresses");
    println!(
        "Supports {} keys (C2 to D7, MIDI notes {}-{})",
        HIGHEST_NOTE - LOWEST_NOTE + 1,
        LOWEST_NOTE,
        HIGHEST_NOTE
    );
    println!("White keys = normal keys, Black keys = shifted keys\n");
}

fn print_mappings(keymap: &KeyMap) {
    for (note, key) in keymap.iter() {
        println!("{:>3}  {}", note, key);
    }
}

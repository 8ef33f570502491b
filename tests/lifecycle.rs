use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use midi2qwerty::config::InjectorConfig;
use midi2qwerty::midi::{PortConnection, PortSource, RawMessage};
use midi2qwerty::{App, AppConfig, AppError, Cli, KeyInjector, Phase, Result};
use tokio::sync::mpsc::Sender;

#[derive(Clone, Default)]
struct RecordingInjector {
    pressed: Arc<Mutex<Vec<String>>>,
}

impl RecordingInjector {
    fn pressed(&self) -> Vec<String> {
        self.pressed.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyInjector for RecordingInjector {
    async fn press(&self, key: &str) {
        self.pressed.lock().unwrap().push(key.to_string());
    }
}

/// Observable state shared between a test and its fake ports
#[derive(Clone, Default)]
struct PortState {
    connected_index: Arc<Mutex<Option<usize>>>,
    closed: Arc<AtomicBool>,
}

impl PortState {
    fn connected_index(&self) -> Option<usize> {
        *self.connected_index.lock().unwrap()
    }

    fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// In-memory stand-in for the MIDI subsystem
#[derive(Default)]
struct FakePorts {
    names: Vec<String>,
    /// Delivered the moment the port opens
    on_connect: Vec<RawMessage>,
    /// Delivered one second after the port opens
    later: Vec<RawMessage>,
    state: PortState,
}

impl FakePorts {
    fn named(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }
}

struct FakeConnection {
    name: String,
    state: PortState,
    // Keeps the queue open until the connection is closed
    _sender: Sender<RawMessage>,
}

impl PortSource for FakePorts {
    type Connection = FakeConnection;

    fn port_names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn connect(self, index: usize, sender: Sender<RawMessage>) -> Result<FakeConnection> {
        *self.state.connected_index.lock().unwrap() = Some(index);
        for message in self.on_connect {
            sender.try_send(message).unwrap();
        }
        let later = self.later;
        let delayed = sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            for message in later {
                let _ = delayed.send(message).await;
            }
        });
        Ok(FakeConnection {
            name: self.names[index].clone(),
            state: self.state,
            _sender: sender,
        })
    }
}

impl PortConnection for FakeConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn close(self) {
        self.state.closed.store(true, Ordering::SeqCst);
    }
}

fn config(startup_delay_secs: u64) -> AppConfig {
    AppConfig {
        client_name: "midi2qwerty-test".to_string(),
        startup_delay_secs,
        queue_capacity: 16,
        injector: InjectorConfig {
            program: "true".to_string(),
            args: Vec::new(),
        },
        mappings: HashMap::new(),
    }
}

fn never_prompted() -> Result<String> {
    panic!("prompt must not be shown");
}

async fn after(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await
}

#[tokio::test(start_paused = true)]
async fn listens_then_shuts_down_on_interrupt() {
    let ports = FakePorts {
        later: vec![vec![0x90, 60, 100], vec![0x80, 60, 0], vec![0x90, 99, 100]],
        ..FakePorts::named(&["Keyboard"])
    };
    let state = ports.state.clone();
    let injector = RecordingInjector::default();
    let cli = Cli { no_delay: true, ..Cli::default() };
    let mut app = App::new(config(3), cli);

    app.run_with(ports, injector.clone(), never_prompted, after(5))
        .await
        .unwrap();

    assert_eq!(
        app.history(),
        [Phase::Starting, Phase::SelectingPort, Phase::Listening, Phase::ShuttingDown]
    );
    assert_eq!(injector.pressed(), ["t"]);
    assert_eq!(state.connected_index(), Some(0));
    assert!(state.closed());
}

#[tokio::test]
async fn no_ports_fails_before_prompt() {
    let ports = FakePorts::default();
    let state = ports.state.clone();
    let mut app = App::new(config(0), Cli::default());

    let result = app
        .run_with(ports, RecordingInjector::default(), never_prompted, std::future::pending())
        .await;

    assert!(matches!(result, Err(AppError::NoPorts)));
    assert_eq!(app.phase(), Phase::SelectingPort);
    assert_eq!(state.connected_index(), None);
}

#[tokio::test]
async fn list_with_no_ports_fails() {
    let cli = Cli { list: true, ..Cli::default() };
    let mut app = App::new(config(0), cli);

    let result = app
        .run_with(
            FakePorts::default(),
            RecordingInjector::default(),
            never_prompted,
            std::future::pending(),
        )
        .await;

    assert!(matches!(result, Err(AppError::NoPorts)));
}

#[tokio::test]
async fn list_does_not_open_a_port() {
    let ports = FakePorts::named(&["A", "B"]);
    let state = ports.state.clone();
    let cli = Cli { list: true, ..Cli::default() };
    let mut app = App::new(config(0), cli);

    app.run_with(ports, RecordingInjector::default(), never_prompted, std::future::pending())
        .await
        .unwrap();

    assert_eq!(state.connected_index(), None);
}

#[tokio::test]
async fn prompts_for_port_when_several() {
    let ports = FakePorts::named(&["A", "B", "C"]);
    let state = ports.state.clone();
    let mut app = App::new(config(0), Cli::default());
    let shutdown = tokio::time::sleep(Duration::from_millis(100));

    app.run_with(ports, RecordingInjector::default(), || Ok("2".to_string()), shutdown)
        .await
        .unwrap();

    assert_eq!(state.connected_index(), Some(2));
    assert!(state.closed());
}

#[tokio::test]
async fn invalid_prompt_answer_is_fatal() {
    let ports = FakePorts::named(&["A", "B"]);
    let state = ports.state.clone();
    let mut app = App::new(config(0), Cli::default());

    let result = app
        .run_with(
            ports,
            RecordingInjector::default(),
            || Ok("5".to_string()),
            std::future::pending(),
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidPort { index: 5, count: 2 })));
    assert_eq!(state.connected_index(), None);
}

#[tokio::test]
async fn interrupt_during_prompt_shuts_down_without_opening() {
    let ports = FakePorts::named(&["A", "B"]);
    let state = ports.state.clone();
    let mut app = App::new(config(0), Cli::default());

    let slow_answer = || {
        std::thread::sleep(Duration::from_millis(200));
        Ok("0".to_string())
    };
    app.run_with(ports, RecordingInjector::default(), slow_answer, std::future::ready(()))
        .await
        .unwrap();

    assert_eq!(app.phase(), Phase::ShuttingDown);
    assert_eq!(state.connected_index(), None);
}

#[tokio::test(start_paused = true)]
async fn interrupt_during_startup_delay_closes_port() {
    let ports = FakePorts {
        on_connect: vec![vec![0x90, 60, 100]],
        ..FakePorts::named(&["Keyboard"])
    };
    let state = ports.state.clone();
    let injector = RecordingInjector::default();
    let mut app = App::new(config(3), Cli::default());

    app.run_with(ports, injector.clone(), never_prompted, after(1))
        .await
        .unwrap();

    assert_eq!(
        app.history(),
        [Phase::Starting, Phase::SelectingPort, Phase::ShuttingDown]
    );
    assert!(state.closed());
    assert!(injector.pressed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn notes_during_startup_delay_are_not_replayed() {
    let ports = FakePorts {
        on_connect: vec![vec![0x90, 60, 100], vec![0x90, 53, 100]],
        later: vec![vec![0x90, 36, 100]],
        ..FakePorts::named(&["Keyboard"])
    };
    let injector = RecordingInjector::default();
    let cli = Cli { port: Some(0), ..Cli::default() };
    let mut app = App::new(config(3), cli);

    // The delayed batch lands during the 3s delay as well
    app.run_with(ports, injector.clone(), never_prompted, after(10))
        .await
        .unwrap();

    assert_eq!(app.phase(), Phase::ShuttingDown);
    assert!(injector.pressed().is_empty());
}

#[tokio::test]
async fn preset_port_out_of_range_is_fatal() {
    let cli = Cli { port: Some(1), ..Cli::default() };
    let mut app = App::new(config(0), cli);

    let result = app
        .run_with(
            FakePorts::named(&["Only"]),
            RecordingInjector::default(),
            never_prompted,
            std::future::pending(),
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidPort { index: 1, count: 1 })));
}

//! Input handling for the Reframe TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

use reframe_engine::Session;

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Dedicated blocking input thread feeding a bounded channel.
///
/// The frame loop drains the channel non-blocking each frame, so rendering
/// cadence is never held hostage to terminal input.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so the input thread unblocks if it is
        // currently backpressured on a send.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain queued terminal events into session commands.
///
/// Returns `Ok(true)` when the participant asked to quit.
pub fn handle_events(session: &mut Session, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let msg = match input.rx.try_recv() {
            Ok(msg) => msg,
            Err(_) => break,
        };
        processed += 1;

        let ev = match msg {
            InputMsg::Event(ev) => ev,
            InputMsg::Error(e) => return Err(anyhow!("terminal input failed: {e}")),
        };

        match ev {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    match key.code {
                        KeyCode::Char('c' | 'q') => return Ok(true),
                        KeyCode::Char('g') => {
                            session.request_generation(session.focus());
                        }
                        KeyCode::Char('d') => session.remove_selected(),
                        _ => {}
                    }
                    continue;
                }
                match key.code {
                    KeyCode::Tab => session.focus_next(),
                    KeyCode::BackTab => session.focus_prev(),
                    KeyCode::Enter => session.submit_idea(),
                    KeyCode::Up => session.select_prev(),
                    KeyCode::Down => session.select_next(),
                    KeyCode::Delete => session.remove_selected(),
                    KeyCode::Backspace => session.backspace(),
                    KeyCode::Char(c) => session.insert_char(c),
                    _ => {}
                }
            }
            Event::Paste(text) => session.insert_str(&text),
            _ => {}
        }
    }
    Ok(false)
}

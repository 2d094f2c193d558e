//! Global keyboard listening using rdev

use rdev::{listen, Event, EventType};
use std::sync::mpsc;
use std::thread;
use tracing::{error, info, trace};

use crate::hotkey::KeyEvent;
use crate::keymap::key_to_symbol;
use crate::ClickerError;

/// Translate an rdev event into a key notification, if it is one we know
pub fn translate(event_type: &EventType) -> Option<KeyEvent> {
    match event_type {
        EventType::KeyPress(key) => key_to_symbol(*key).map(KeyEvent::Down),
        EventType::KeyRelease(key) => key_to_symbol(*key).map(KeyEvent::Up),
        _ => None,
    }
}

/// Input listener that captures global keyboard events
pub struct InputListener {
    /// Sender for key events
    sender: mpsc::Sender<KeyEvent>,
}

impl InputListener {
    /// Create a new InputListener with the given channel sender
    pub fn new(sender: mpsc::Sender<KeyEvent>) -> Self {
        Self { sender }
    }

    /// Start listening for keyboard events in a background thread
    ///
    /// Every key press/release that maps to a known symbol is forwarded
    /// through the channel. rdev's listen loop never returns on success, so
    /// the thread lives until the process exits; if it does finish, joining
    /// it yields the reason.
    pub fn start(self) -> thread::JoinHandle<Result<(), ClickerError>> {
        thread::spawn(move || {
            info!("Input listener started");

            let sender = self.sender;

            let callback = move |event: Event| {
                if let Some(key_event) = translate(&event.event_type) {
                    trace!("{:?}", key_event);

                    if let Err(e) = sender.send(key_event) {
                        error!("Failed to send key event: {}", e);
                    }
                }
            };

            listen(callback).map_err(|e| {
                error!("Error in input listener: {:?}", e);
                ClickerError::Listener(format!("{:?}", e))
            })
        })
    }
}

/// Create a channel for key events and return both ends
pub fn create_event_channel() -> (mpsc::Sender<KeyEvent>, mpsc::Receiver<KeyEvent>) {
    mpsc::channel()
}

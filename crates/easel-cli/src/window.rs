use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use easel_protocol::{Event, EventSource, NativeSurface};
use tracing::debug;

/// A headless window whose events come from a channel.
///
/// Events are either queued up front ([`ScriptedWindow::from_events`]) or
/// produced by a background thread ([`ScriptedWindow::spawn`]), the way a
/// platform event loop would feed a render thread.
pub struct ScriptedWindow {
    events: Receiver<Event>,
    surface: NativeSurface,
    producer: Option<JoinHandle<()>>,
    disconnected: bool,
}

impl ScriptedWindow {
    /// All events are pending immediately.
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let (tx, rx) = unbounded();
        for event in events {
            // the receiver is alive, sending cannot fail
            let _ = tx.send(event);
        }
        Self {
            events: rx,
            surface: NativeSurface::default(),
            producer: None,
            disconnected: false,
        }
    }

    /// Emits `script` from a producer thread, one event every `interval`.
    pub fn spawn(script: Vec<Event>, interval: Duration) -> Self {
        let (tx, rx) = unbounded();
        let producer = std::thread::spawn(move || {
            for event in script {
                std::thread::sleep(interval);
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
        Self {
            events: rx,
            surface: NativeSurface::default(),
            producer: Some(producer),
            disconnected: false,
        }
    }

    /// True once the producer is gone and every event has been polled.
    pub fn is_exhausted(&self) -> bool {
        self.disconnected
    }
}

impl EventSource for ScriptedWindow {
    fn native_surface(&self) -> NativeSurface {
        self.surface
    }

    fn poll(&mut self) -> Option<Event> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.disconnected {
                    debug!("event script exhausted");
                    self.disconnected = true;
                }
                None
            }
        }
    }
}

impl Drop for ScriptedWindow {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            // dropping the receiver stops the producer at its next send
            let (_, rx) = unbounded();
            self.events = rx;
            let _ = producer.join();
        }
    }
}

/// The script played by `easel demo`: a resize, some input, then a close.
pub fn demo_script(width: u32, height: u32) -> Vec<Event> {
    vec![
        Event::Resize { width, height },
        Event::MouseMove { x: 12, y: 34 },
        Event::Key {
            key: 32,
            pressed: true,
        },
        Event::Key {
            key: 32,
            pressed: false,
        },
        Event::Rune('e'),
        Event::WindowClose,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queued_events_poll_in_order() {
        let mut window = ScriptedWindow::from_events(vec![
            Event::Resize {
                width: 10,
                height: 20,
            },
            Event::WindowClose,
        ]);
        assert_eq!(
            window.poll(),
            Some(Event::Resize {
                width: 10,
                height: 20
            })
        );
        assert_eq!(window.poll(), Some(Event::WindowClose));
        assert_eq!(window.poll(), None);
        assert!(window.is_exhausted());
    }

    #[test]
    fn test_spawned_script_is_delivered() {
        let mut window = ScriptedWindow::spawn(demo_script(8, 8), Duration::ZERO);
        let mut seen = Vec::new();
        while !window.is_exhausted() {
            if let Some(event) = window.poll() {
                seen.push(event);
            }
        }
        assert_eq!(seen, demo_script(8, 8));
    }
}

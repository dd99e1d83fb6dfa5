//! Live input to EventLog
//!
//! One subscription stays open for the whole session and is drained in
//! publish order; pointer and keyboard events are then routed to their own
//! handlers. Only click presses are logged. The stop key ends the session;
//! the checkpoint key captures the region instead of being logged.

use crate::events::Action;
use crate::hub::{CancelToken, InputSource, DEFAULT_CAPACITY};
use crate::log::EventLog;
use crate::verifier::ScreenVerifier;
use crossbeam_channel::RecvTimeoutError;
use macroloop_core::{Clock, Error, InputEvent, Key, NamedKey, Result, ScreenGrabber};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// How often the loop wakes to check for cancellation when input is idle.
const IDLE_TICK: Duration = Duration::from_millis(50);

/// Recorder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    /// Ends the recording; never logged
    pub stop_key: Key,
    /// Captures a screenshot checkpoint; logged as `screenshot`
    pub checkpoint_key: Key,
    /// Queue size before events are dropped
    pub channel_capacity: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            stop_key: Key::Named(NamedKey::Enter),
            checkpoint_key: Key::Named(NamedKey::Esc),
            channel_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Everything a recording session touches besides the input feed.
pub struct RecordingTarget<'a> {
    pub clock: &'a mut dyn Clock,
    pub verifier: &'a mut ScreenVerifier,
    pub screen: &'a mut dyn ScreenGrabber,
}

enum Flow {
    Continue,
    Stop,
}

/// The recorder
pub struct Recorder {
    config: RecorderConfig,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_config(RecorderConfig::default())
    }

    pub fn with_config(config: RecorderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Record until the stop key (or `cancel`). The caller persists the log.
    pub fn record(
        &self,
        source: &dyn InputSource,
        target: RecordingTarget<'_>,
        cancel: &CancelToken,
    ) -> Result<EventLog> {
        // A single feed keeps pointer and keyboard events in the order they
        // happened, however long a checkpoint grab stalls the loop.
        let feed = source.subscribe_with_capacity(self.config.channel_capacity)?;

        let mut session = Session {
            config: &self.config,
            log: EventLog::new(),
            target,
        };
        session.target.clock.start();
        info!(stop = %self.config.stop_key, checkpoint = %self.config.checkpoint_key, "recording started");

        loop {
            if cancel.is_cancelled() {
                info!("recording cancelled");
                break;
            }
            let event = match feed.recv_timeout(IDLE_TICK) {
                Ok(event) => event,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(feed_closed()),
            };
            let flow = match event {
                InputEvent::Click { .. } => session.on_pointer(event),
                _ => session.on_key(event)?,
            };
            if let Flow::Stop = flow {
                break;
            }
        }

        drop(feed);
        info!(records = session.log.len(), "recording stopped");
        Ok(session.log)
    }
}

struct Session<'c, 't> {
    config: &'c RecorderConfig,
    log: EventLog,
    target: RecordingTarget<'t>,
}

impl Session<'_, '_> {
    fn on_pointer(&mut self, event: InputEvent) -> Flow {
        if let InputEvent::Click {
            button,
            position,
            pressed: true,
        } = event
        {
            let offset = self.target.clock.check();
            debug!(offset, %button, %position, "click");
            self.log.push(offset, &Action::Click { button, position });
        }
        Flow::Continue
    }

    fn on_key(&mut self, event: InputEvent) -> Result<Flow> {
        match event {
            InputEvent::KeyPress(key) if key == self.config.stop_key => return Ok(Flow::Stop),
            InputEvent::KeyPress(key) if key == self.config.checkpoint_key => {
                let n = self
                    .target
                    .verifier
                    .capture_checkpoint(&mut *self.target.screen)?;
                // Stamped after the grab, so replay waits for the same moment.
                let offset = self.target.clock.check();
                debug!(offset, checkpoint = n, "screenshot");
                self.log.push(offset, &Action::Screenshot);
            }
            InputEvent::KeyPress(key) => {
                let offset = self.target.clock.check();
                debug!(offset, %key, "key press");
                self.log.push(offset, &Action::KeyPress(key));
            }
            InputEvent::KeyRelease(key) => {
                let offset = self.target.clock.check();
                debug!(offset, %key, "key release");
                self.log.push(offset, &Action::KeyRelease(key));
            }
            InputEvent::Click { .. } => {}
        }
        Ok(Flow::Continue)
    }
}

fn feed_closed() -> Error {
    Error::listener_failed("input feed closed while recording")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::InputHub;
    use crate::storage::MacroStore;
    use image::{Rgba, RgbaImage};
    use macroloop_core::{BoundingBox, Button, Frame, Point};
    use std::cell::Cell;
    use std::thread;

    struct Ticks(Cell<f64>);

    impl Clock for Ticks {
        fn start(&mut self) {
            self.0.set(0.0);
        }

        fn check(&self) -> f64 {
            let now = self.0.get() + 0.25;
            self.0.set(now);
            now
        }
    }

    struct Gray;

    impl ScreenGrabber for Gray {
        fn grab(&mut self, region: &BoundingBox) -> Result<Frame> {
            Ok(RgbaImage::from_pixel(
                region.width() as u32,
                region.height() as u32,
                Rgba([128, 128, 128, 255]),
            ))
        }
    }

    fn record_with(events: Vec<InputEvent>) -> (EventLog, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let region = BoundingBox::new(Point::new(0, 0), Point::new(4, 4));
        let mut verifier = ScreenVerifier::new(region, MacroStore::at(dir.path()));
        let mut clock = Ticks(Cell::new(0.0));
        let hub = InputHub::new();

        let feeder = {
            let hub = hub.clone();
            thread::spawn(move || {
                while hub.subscriber_count() < 1 {
                    thread::yield_now();
                }
                for event in events {
                    hub.publish(event);
                }
            })
        };

        let log = Recorder::new()
            .record(
                &hub,
                RecordingTarget {
                    clock: &mut clock,
                    verifier: &mut verifier,
                    screen: &mut Gray,
                },
                &CancelToken::new(),
            )
            .unwrap();
        feeder.join().unwrap();
        (log, dir)
    }

    #[test]
    fn logs_presses_and_stops_on_enter() {
        let (log, _dir) = record_with(vec![
            InputEvent::Click {
                button: Button::Left,
                position: Point::new(10, 20),
                pressed: true,
            },
            InputEvent::Click {
                button: Button::Left,
                position: Point::new(10, 20),
                pressed: false,
            },
            InputEvent::KeyPress(Key::Char('a')),
            InputEvent::KeyRelease(Key::Char('a')),
            InputEvent::KeyPress(Key::Named(NamedKey::Enter)),
            InputEvent::KeyPress(Key::Char('z')),
        ]);

        let steps = log.steps().unwrap();
        let actions: Vec<_> = steps.iter().map(|s| s.action.clone()).collect();
        assert_eq!(
            actions,
            vec![
                Action::Click {
                    button: Button::Left,
                    position: Point::new(10, 20)
                },
                Action::KeyPress(Key::Char('a')),
                Action::KeyRelease(Key::Char('a')),
            ]
        );
        assert!(steps.windows(2).all(|w| w[0].offset < w[1].offset));
    }

    #[test]
    fn checkpoint_key_captures_instead_of_logging() {
        let (log, dir) = record_with(vec![
            InputEvent::KeyPress(Key::Named(NamedKey::Esc)),
            InputEvent::KeyRelease(Key::Named(NamedKey::Esc)),
            InputEvent::KeyPress(Key::Named(NamedKey::Enter)),
        ]);

        let steps = log.steps().unwrap();
        assert_eq!(steps[0].action, Action::Screenshot);
        assert_eq!(steps[1].action, Action::KeyRelease(Key::Named(NamedKey::Esc)));
        assert!(dir.path().join("screen1.png").is_file());
    }

    #[test]
    fn back_to_back_events_keep_their_order() {
        let expected = vec![
            Action::KeyPress(Key::Char('a')),
            Action::Click {
                button: Button::Left,
                position: Point::new(1, 2),
            },
            Action::KeyRelease(Key::Char('a')),
            Action::Screenshot,
            Action::Click {
                button: Button::Right,
                position: Point::new(3, 4),
            },
        ];
        for _ in 0..50 {
            let (log, _dir) = record_with(vec![
                InputEvent::KeyPress(Key::Char('a')),
                InputEvent::Click {
                    button: Button::Left,
                    position: Point::new(1, 2),
                    pressed: true,
                },
                InputEvent::KeyRelease(Key::Char('a')),
                InputEvent::KeyPress(Key::Named(NamedKey::Esc)),
                InputEvent::Click {
                    button: Button::Right,
                    position: Point::new(3, 4),
                    pressed: true,
                },
                InputEvent::KeyPress(Key::Named(NamedKey::Enter)),
            ]);
            let actions: Vec<_> = log.steps().unwrap().into_iter().map(|s| s.action).collect();
            assert_eq!(actions, expected);
        }
    }

    #[test]
    fn cancel_token_ends_recording() {
        let hub = InputHub::new();
        let dir = tempfile::tempdir().unwrap();
        let region = BoundingBox::new(Point::new(0, 0), Point::new(2, 2));
        let mut verifier = ScreenVerifier::new(region, MacroStore::at(dir.path()));
        let cancel = CancelToken::new();
        cancel.cancel();

        let log = Recorder::new()
            .record(
                &hub,
                RecordingTarget {
                    clock: &mut Ticks(Cell::new(0.0)),
                    verifier: &mut verifier,
                    screen: &mut Gray,
                },
                &cancel,
            )
            .unwrap();
        assert!(log.is_empty());
    }
}

//! Endless replay with screenshot checkpoints
//!
//! The player busy-polls the clock against the head of a FIFO queue. Each
//! executed step is re-queued one period after its nominal offset, so every
//! cycle stays on the same phase grid no matter how late a step fires.
//! Cancellation is checked between steps; a step in flight always finishes.

use crate::events::{Action, Step};
use crate::hub::{CancelToken, InputSource, Subscription};
use crate::interpreter::Program;
use crate::verifier::ScreenVerifier;
use crossbeam_channel::RecvTimeoutError;
use macroloop_core::{
    Clock, Error, ErrorCode, InputEvent, InputSimulator, Key, NamedKey, Result, ScreenGrabber,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

const LISTENER_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    pub stop_key: Key,
    /// Warn when a step fires this many seconds late. `None` means one full
    /// period.
    pub lag_warning: Option<f64>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            stop_key: Key::Named(NamedKey::Enter),
            lag_warning: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerState {
    Idle,
    Running,
    Stopped,
    Aborted,
}

/// Replay statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayStats {
    pub actions: usize,
    pub clicks: usize,
    pub key_presses: usize,
    pub key_releases: usize,
    pub checkpoints: usize,
    /// Completed passes over the whole program.
    pub cycles: usize,
    /// Worst observed delay between a step's due time and its execution, in
    /// seconds.
    pub max_lag: f64,
}

impl ReplayStats {
    fn count(&mut self, action: &Action) {
        self.actions += 1;
        match action {
            Action::Click { .. } => self.clicks += 1,
            Action::KeyPress(_) => self.key_presses += 1,
            Action::KeyRelease(_) => self.key_releases += 1,
            Action::Screenshot => self.checkpoints += 1,
        }
    }
}

/// How a replay ended. Neither outcome is an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReplayOutcome {
    /// Cancelled by the user.
    Stopped { stats: ReplayStats },
    /// A checkpoint did not match its reference.
    Aborted {
        checkpoint: usize,
        offset: f64,
        stats: ReplayStats,
    },
}

impl ReplayOutcome {
    pub fn stats(&self) -> &ReplayStats {
        match self {
            ReplayOutcome::Stopped { stats } | ReplayOutcome::Aborted { stats, .. } => stats,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, ReplayOutcome::Aborted { .. })
    }
}

/// The OS-facing collaborators a replay drives.
pub struct Devices<'a> {
    pub input: &'a mut dyn InputSimulator,
    pub screen: &'a mut dyn ScreenGrabber,
}

pub struct Player {
    program: Vec<Step>,
    queue: VecDeque<Step>,
    period: f64,
    checkpoint_total: usize,
    verifier: ScreenVerifier,
    state: PlayerState,
    config: ReplayConfig,
}

impl Player {
    pub fn new(program: Program, verifier: ScreenVerifier) -> Self {
        let period = program.period();
        let checkpoint_total = program.checkpoint_total();
        let program = program.into_steps();
        Self {
            queue: program.iter().cloned().collect(),
            program,
            period,
            checkpoint_total,
            verifier,
            state: PlayerState::Idle,
            config: ReplayConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn checkpoint_total(&self) -> usize {
        self.checkpoint_total
    }

    /// Pending steps in firing order.
    pub fn queue(&self) -> impl Iterator<Item = &Step> {
        self.queue.iter()
    }

    pub fn verifier(&self) -> &ScreenVerifier {
        &self.verifier
    }

    /// Replay until `cancel` is set or a checkpoint mismatches. Every run
    /// starts from the program's own offsets.
    pub fn run(
        &mut self,
        mut devices: Devices<'_>,
        clock: &mut dyn Clock,
        cancel: &CancelToken,
    ) -> Result<ReplayOutcome> {
        let lag_warning = self.config.lag_warning.unwrap_or(self.period);
        let mut stats = ReplayStats::default();

        self.queue = self.program.iter().cloned().collect();
        self.verifier.reset();
        self.state = PlayerState::Running;
        info!(
            steps = self.queue.len(),
            period = self.period,
            checkpoints = self.checkpoint_total,
            "replay started"
        );
        clock.start();

        loop {
            if cancel.is_cancelled() {
                self.state = PlayerState::Stopped;
                stats.cycles = stats.actions / self.program.len().max(1);
                info!(actions = stats.actions, cycles = stats.cycles, "stopped by the user");
                return Ok(ReplayOutcome::Stopped { stats });
            }

            let Some(due) = self.queue.front().map(|s| s.offset) else {
                self.state = PlayerState::Stopped;
                return Ok(ReplayOutcome::Stopped { stats });
            };
            let now = clock.check();
            if now < 0.0 {
                self.state = PlayerState::Stopped;
                return Err(Error::new(
                    ErrorCode::Unknown,
                    format!("clock reading is negative: {}", now),
                ));
            }
            if now < due {
                std::hint::spin_loop();
                continue;
            }
            let Some(step) = self.queue.pop_front() else {
                continue;
            };

            let lag = now - step.offset;
            stats.max_lag = stats.max_lag.max(lag);
            if lag > lag_warning {
                warn!(offset = step.offset, lag, "replay is running behind");
            }

            let checkpoint = self.verifier.checkpoint_index();
            if let Err(e) = self.execute(&step.action, &mut devices) {
                self.state = PlayerState::Stopped;
                return Err(e);
            }
            stats.count(&step.action);

            if step.action.is_screenshot() && !self.verifier.last_result() {
                self.state = PlayerState::Aborted;
                stats.cycles = stats.actions / self.program.len().max(1);
                warn!(checkpoint, offset = step.offset, "unexpected difference found");
                return Ok(ReplayOutcome::Aborted {
                    checkpoint,
                    offset: step.offset,
                    stats,
                });
            }

            self.verifier.wrap(self.checkpoint_total);
            self.queue.push_back(Step::new(step.offset + self.period, step.action));
        }
    }

    /// `run`, with a listener that cancels on the configured stop key for the
    /// duration of the replay.
    pub fn run_until_stop_key(
        &mut self,
        source: &dyn InputSource,
        devices: Devices<'_>,
        clock: &mut dyn Clock,
        cancel: &CancelToken,
    ) -> Result<ReplayOutcome> {
        let stop_key = self.config.stop_key.clone();
        if self
            .queue
            .iter()
            .any(|s| s.action == Action::KeyPress(stop_key.clone()))
        {
            warn!(key = %stop_key, "macro presses the stop key; replay will stop itself");
        }

        let listener = StopListener::spawn(source.subscribe()?, stop_key, cancel.clone());
        let outcome = self.run(devices, clock, cancel);
        listener.shutdown();
        outcome
    }

    fn execute(&mut self, action: &Action, devices: &mut Devices<'_>) -> Result<()> {
        debug!(%action, "execute");
        match action {
            Action::Click { button, position } => {
                devices.input.move_to(*position)?;
                devices.input.click(*button)
            }
            Action::KeyPress(key) => devices.input.key_press(key),
            Action::KeyRelease(key) => devices.input.key_release(key),
            Action::Screenshot => self.verifier.verify_checkpoint(&mut *devices.screen).map(|_| ()),
        }
    }
}

/// Background thread that cancels a token when the stop key is pressed.
pub struct StopListener {
    done: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl StopListener {
    pub fn spawn(subscription: Subscription, stop_key: Key, cancel: CancelToken) -> Self {
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();
        let thread = thread::spawn(move || {
            while !flag.load(Ordering::Relaxed) && !cancel.is_cancelled() {
                match subscription.recv_timeout(LISTENER_POLL) {
                    Ok(InputEvent::KeyPress(key)) if key == stop_key => {
                        debug!(%key, "stop key pressed");
                        cancel.cancel();
                    }
                    Ok(_) | Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self {
            done,
            thread: Some(thread),
        }
    }

    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.done.store(true, Ordering::Relaxed);
        if let Some(t) = self.thread.take() {
            let _ = t.join();
        }
    }
}

impl Drop for StopListener {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hub::InputHub;
    use crate::log::EventLog;
    use crate::interpreter::Interpreter;
    use crate::storage::MacroStore;
    use macroloop_core::{BoundingBox, Button, Frame, Point};
    use std::cell::Cell;

    /// Reads a fixed value, after advancing by `step` if one is set.
    struct FixedClock {
        now: Cell<f64>,
        step: f64,
    }

    impl Clock for FixedClock {
        fn start(&mut self) {}

        fn check(&self) -> f64 {
            let now = self.now.get() + self.step;
            self.now.set(now);
            now
        }
    }

    #[derive(Default)]
    struct CountingInput {
        calls: usize,
    }

    impl InputSimulator for CountingInput {
        fn move_to(&mut self, _: Point) -> Result<()> {
            self.calls += 1;
            Ok(())
        }
        fn click(&mut self, _: Button) -> Result<()> {
            self.calls += 1;
            Ok(())
        }
        fn key_press(&mut self, _: &Key) -> Result<()> {
            self.calls += 1;
            Ok(())
        }
        fn key_release(&mut self, _: &Key) -> Result<()> {
            self.calls += 1;
            Ok(())
        }
    }

    struct NoScreen;

    impl ScreenGrabber for NoScreen {
        fn grab(&mut self, _: &BoundingBox) -> Result<Frame> {
            Err(Error::capture_failed("no screen in this test"))
        }
    }

    fn key_player(dir: &tempfile::TempDir) -> Player {
        let log = EventLog::parse("0.0:\tkey_press('a')\n0.5:\tkey_release('a')\n").unwrap();
        let program = Interpreter::parse(&log).unwrap();
        let region = BoundingBox::new(Point::new(0, 0), Point::new(1, 1));
        Player::new(program, ScreenVerifier::new(region, MacroStore::at(dir.path())))
    }

    #[test]
    fn stats_count_by_kind() {
        let mut stats = ReplayStats::default();
        stats.count(&Action::Screenshot);
        stats.count(&Action::KeyPress(Key::Char('a')));
        stats.count(&Action::KeyRelease(Key::Char('a')));
        assert_eq!(stats.actions, 3);
        assert_eq!(stats.checkpoints, 1);
        assert_eq!(stats.clicks, 0);
    }

    #[test]
    fn stop_listener_cancels_on_stop_key() {
        let hub = InputHub::new();
        let cancel = CancelToken::new();
        let listener = StopListener::spawn(
            hub.subscribe().unwrap(),
            Key::Named(NamedKey::Enter),
            cancel.clone(),
        );

        hub.publish(InputEvent::KeyPress(Key::Char('x')));
        hub.publish(InputEvent::KeyRelease(Key::Named(NamedKey::Enter)));
        hub.publish(InputEvent::KeyPress(Key::Named(NamedKey::Enter)));
        while !cancel.is_cancelled() {
            thread::yield_now();
        }
        listener.shutdown();
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn stop_listener_shuts_down_quietly() {
        let hub = InputHub::new();
        let cancel = CancelToken::new();
        let listener = StopListener::spawn(hub.subscribe().unwrap(), Key::Char('q'), cancel.clone());
        drop(listener);
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn new_player_is_idle_with_program_order() {
        let log = EventLog::parse("0.5:\tkey_press('a')\n1:\tscreenshot\n").unwrap();
        let program = Interpreter::parse(&log).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let region = BoundingBox::new(Point::new(0, 0), Point::new(1, 1));
        let player = Player::new(program, ScreenVerifier::new(region, MacroStore::at(dir.path())));

        assert_eq!(player.state(), PlayerState::Idle);
        assert_eq!(player.period(), 1.0);
        assert_eq!(player.checkpoint_total(), 1);
        let offsets: Vec<f64> = player.queue().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.5, 1.0]);
    }

    #[test]
    fn negative_clock_reading_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = key_player(&dir);
        let mut input = CountingInput::default();
        let mut clock = FixedClock {
            now: Cell::new(-0.1),
            step: 0.0,
        };

        let result = player.run(
            Devices {
                input: &mut input,
                screen: &mut NoScreen,
            },
            &mut clock,
            &CancelToken::new(),
        );

        assert!(result.is_err());
        assert_eq!(input.calls, 0);
        assert_eq!(player.state(), PlayerState::Stopped);
    }

    /// Cancels once the fourth input call has been made.
    struct CancelAfterFour<'a> {
        calls: usize,
        cancel: &'a CancelToken,
    }

    impl CancelAfterFour<'_> {
        fn tick(&mut self) -> Result<()> {
            self.calls += 1;
            if self.calls == 4 {
                self.cancel.cancel();
            }
            Ok(())
        }
    }

    impl InputSimulator for CancelAfterFour<'_> {
        fn move_to(&mut self, _: Point) -> Result<()> {
            self.tick()
        }
        fn click(&mut self, _: Button) -> Result<()> {
            self.tick()
        }
        fn key_press(&mut self, _: &Key) -> Result<()> {
            self.tick()
        }
        fn key_release(&mut self, _: &Key) -> Result<()> {
            self.tick()
        }
    }

    #[test]
    fn every_run_starts_from_the_program_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let mut player = key_player(&dir);

        for _ in 0..2 {
            let cancel = CancelToken::new();
            let mut input = CancelAfterFour {
                calls: 0,
                cancel: &cancel,
            };
            let mut clock = FixedClock {
                now: Cell::new(0.0),
                step: 0.25,
            };

            let outcome = player
                .run(
                    Devices {
                        input: &mut input,
                        screen: &mut NoScreen,
                    },
                    &mut clock,
                    &cancel,
                )
                .unwrap();

            assert_eq!(outcome.stats().actions, 4);
            assert_eq!(outcome.stats().cycles, 2);
            let offsets: Vec<f64> = player.queue().map(|s| s.offset).collect();
            assert_eq!(offsets, vec![1.0, 1.5]);
        }
    }
}

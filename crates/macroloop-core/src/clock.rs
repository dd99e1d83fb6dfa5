//! Elapsed-time source for recording and replay

use std::time::Instant;

/// Seconds elapsed since the last `start()`.
pub trait Clock {
    fn start(&mut self);
    fn check(&self) -> f64;
}

/// Wall clock backed by `Instant`, which is monotonic: readings never go
/// backwards, so `check()` is never negative.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    base: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { base: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn start(&mut self) {
        self.base = Instant::now();
    }

    fn check(&self) -> f64 {
        self.base.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn start_resets_the_base() {
        let mut clock = MonotonicClock::new();
        std::thread::sleep(Duration::from_millis(20));
        assert!(clock.check() >= 0.02);
        clock.start();
        assert!(clock.check() < 0.02);
    }

    #[test]
    fn readings_are_non_decreasing() {
        let clock = MonotonicClock::new();
        let mut last = 0.0;
        for _ in 0..1000 {
            let now = clock.check();
            assert!(now >= last);
            last = now;
        }
    }
}

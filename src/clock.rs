//! Monotonic session clock

use std::time::{Duration, Instant};

/// Seconds elapsed since the session started, immune to wall-clock jumps
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started: Instant,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::start()
    }
}

impl SessionClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_clock_is_monotonic() {
        let clock = SessionClock::start();
        let first = clock.now();
        thread::sleep(Duration::from_millis(5));
        let second = clock.now();
        assert!(first >= 0.0);
        assert!(second > first);
    }
}

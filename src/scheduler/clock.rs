//! Audio clocks: the time base the scheduler looks ahead against.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A monotonic clock in seconds.
pub trait AudioClock {
    fn now(&self) -> f64;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.time.set(seconds);
    }

    pub fn advance(&self, seconds: f64) {
        self.time.set(self.time.get() + seconds);
    }
}

impl AudioClock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

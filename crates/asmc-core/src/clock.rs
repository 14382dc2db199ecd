//! Controller time source
//!
//! The controller never reads wall-clock time itself; it is handed a
//! [`MonotonicClock`] so tests and simulations can drive time explicitly.
//! Tick intervals are clamped to [`MAX_DT`] to bound the adaptive
//! integrator's single-step contribution after scheduling stalls.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Upper bound on the tick interval used for integration [s]
pub const MAX_DT: f64 = 0.04;

/// Clamp a tick interval to `[0, MAX_DT]`
///
/// Negative and NaN intervals map to zero.
pub fn clamp_dt(dt: f64) -> f64 {
    if dt > 0.0 {
        dt.min(MAX_DT)
    } else {
        0.0
    }
}

/// Monotonic time source, in seconds from an arbitrary origin
pub trait MonotonicClock {
    fn now(&self) -> f64;
}

/// Clock backed by [`std::time::Instant`]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually advanced clock for tests and simulation
///
/// Clones share the same time, so one handle can be given to the controller
/// while another advances it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self { time: Rc::new(Cell::new(start)) }
    }

    pub fn advance(&self, dt: f64) {
        self.time.set(self.time.get() + dt);
    }

    pub fn set(&self, t: f64) {
        self.time.set(t);
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> f64 {
        self.time.get()
    }
}

/// Measures clamped intervals between successive ticks
#[derive(Debug, Clone)]
pub struct TickTimer<C> {
    clock: C,
    last: f64,
}

impl<C: MonotonicClock> TickTimer<C> {
    /// Start timing; the first tick measures from construction
    pub fn new(clock: C) -> Self {
        let last = clock.now();
        Self { clock, last }
    }

    /// Clamped interval since the previous tick [s]
    pub fn tick(&mut self) -> f64 {
        let now = self.clock.now();
        let dt = now - self.last;
        self.last = now;
        clamp_dt(dt)
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

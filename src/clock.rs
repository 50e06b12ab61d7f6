use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time, in seconds since an arbitrary epoch.
pub trait Clock {
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Wall clock, seconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(since) => since.as_secs_f64(),
            Err(before) => -before.duration().as_secs_f64(),
        }
    }
}

/// Clock that hands out a pre-programmed sequence of readings.
///
/// Once the queue runs dry the last reading is repeated, so a test only has
/// to script the reads it cares about.
#[derive(Debug, Default)]
pub struct FakeClock {
    readings: RefCell<VecDeque<f64>>,
    last: Cell<f64>,
}

impl FakeClock {
    pub fn new<I: IntoIterator<Item = f64>>(readings: I) -> Self {
        Self {
            readings: RefCell::new(readings.into_iter().collect()),
            last: Cell::new(0.0),
        }
    }

    /// Queue a reading `secs` after the latest scheduled one.
    pub fn advance(&self, secs: f64) {
        let mut readings = self.readings.borrow_mut();
        let base = readings.back().copied().unwrap_or(self.last.get());
        readings.push_back(base + secs);
    }

    pub fn remaining(&self) -> usize {
        self.readings.borrow().len()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> f64 {
        if let Some(reading) = self.readings.borrow_mut().pop_front() {
            self.last.set(reading);
        }
        self.last.get()
    }
}

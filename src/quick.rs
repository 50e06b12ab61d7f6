//! Two-call measurement without an [`IntervalTimer`](crate::timer::IntervalTimer).
//!
//! ```no_run
//! use simpler_timer::quick::quick_interval;
//!
//! let start = quick_interval(None);
//! // ... work ...
//! let elapsed = quick_interval(Some(start));
//! ```

use std::io::{self, Write};

use log::{trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::format;

/// With no `start`, return the current time. With a `start`, print the
/// elapsed-time line to stdout and return the elapsed seconds.
pub fn quick_interval(start: Option<f64>) -> f64 {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    quick_interval_with(&SystemClock, start, &mut handle)
}

/// [`quick_interval`] on an arbitrary clock and writer. A failed write is
/// logged and does not change the returned value.
pub fn quick_interval_with<C: Clock, W: Write>(
    clock: &C,
    start: Option<f64>,
    out: &mut W,
) -> f64 {
    let now = clock.now();
    trace!("quick interval clock read {now}");
    let Some(start) = start else {
        return now;
    };

    let elapsed = now - start;
    if let Err(err) = writeln!(out, "{}", format::report_line(elapsed, false)) {
        warn!("failed to print elapsed time: {err}");
    }
    elapsed
}

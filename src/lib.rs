pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod quick;
pub mod timer;

pub mod prelude {
    pub use crate::clock::{Clock, FakeClock, SystemClock};
    pub use crate::error::{ReportError, TimerStateError};
    pub use crate::format::format_duration;
    pub use crate::quick::quick_interval;
    pub use crate::timer::{IntervalTimer, ProgressMode, TimerStatus};
}

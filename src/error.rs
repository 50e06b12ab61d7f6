use std::io;
use thiserror::Error;

/// A timer operation was called out of sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TimerStateError {
    #[error("timer not ended; call end() to stop")]
    NotEnded,
    #[error("timer inactive; call start() to start")]
    Inactive,
    #[error("timer not running; call start() to initiate")]
    NotRunning,
}

/// Failure while printing an elapsed-time report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    State(#[from] TimerStateError),
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = TimerStateError> = std::result::Result<T, E>;

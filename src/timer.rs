use std::fmt;
use std::io::{self, Write};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::error::{ReportError, Result, TimerStateError};
use crate::format;

/// Observational status of an [`IntervalTimer`].
///
/// Only `end` and `progress_with` look at it (to close a trailing pause).
/// Every guard checks whether a start instant or an elapsed value is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerStatus {
    Active,
    Paused,
    #[serde(rename = "Active (resumed)")]
    Resumed,
    Inactive,
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimerStatus::Active => "Active",
            TimerStatus::Paused => "Paused",
            TimerStatus::Resumed => "Active (resumed)",
            TimerStatus::Inactive => "Inactive",
        };
        f.write_str(s)
    }
}

/// How `progress_with` treats a pause that has not been resumed yet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressMode {
    /// Only completed pause pairs are subtracted; an open pause still counts
    /// as running time.
    #[default]
    AsRecorded,
    /// Treat an open pause as ending now, the same way `end` closes it.
    CloseOpenPause,
}

/// Serializable view of a timer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub running: bool,
    pub elapsed: Option<f64>,
    pub pause_marks: Vec<f64>,
}

/// Sum of `resumed - paused` over consecutive mark pairs. A trailing
/// unpaired mark contributes nothing.
fn paused_total(marks: &[f64]) -> f64 {
    marks
        .chunks_exact(2)
        .map(|pair| pair[1] - pair[0])
        .sum()
}

#[derive(Debug)]
pub struct IntervalTimer<C: Clock = SystemClock> {
    clock: C,
    start_instant: Option<f64>,
    elapsed: Option<f64>,
    status: TimerStatus,
    pause_marks: Vec<f64>,
}

impl Default for IntervalTimer<SystemClock> {
    fn default() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl IntervalTimer<SystemClock> {
    /// Create a timer on the wall clock. The timer is already running.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> IntervalTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        let start_instant = clock.now();
        debug!("timer started at {start_instant}");
        IntervalTimer {
            clock,
            start_instant: Some(start_instant),
            elapsed: None,
            status: TimerStatus::Active,
            pause_marks: Vec::new(),
        }
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.start_instant.is_some()
    }

    pub fn pause_marks(&self) -> &[f64] {
        &self.pause_marks
    }

    /// Restart the timer. Only allowed once the previous session has ended.
    pub fn start(&mut self) -> Result<()> {
        if self.elapsed.is_none() {
            return Err(TimerStateError::NotEnded);
        }
        let now = self.clock.now();
        self.start_instant = Some(now);
        self.elapsed = None;
        self.status = TimerStatus::Active;
        self.pause_marks.clear();
        debug!("timer restarted at {now}");
        Ok(())
    }

    /// Record a pause mark. Consecutive pauses are accepted as-is.
    pub fn pause(&mut self) -> Result<()> {
        if !self.is_active() {
            return Err(TimerStateError::Inactive);
        }
        let now = self.clock.now();
        self.pause_marks.push(now);
        self.status = TimerStatus::Paused;
        debug!("timer paused at {now} ({} marks)", self.pause_marks.len());
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if !self.is_active() {
            return Err(TimerStateError::Inactive);
        }
        let now = self.clock.now();
        self.pause_marks.push(now);
        self.status = TimerStatus::Resumed;
        debug!("timer resumed at {now} ({} marks)", self.pause_marks.len());
        Ok(())
    }

    /// Stop the timer and return the elapsed seconds, excluding pauses.
    pub fn end(&mut self) -> Result<f64> {
        let start_instant = self.start_instant.ok_or(TimerStateError::NotRunning)?;
        let now = self.clock.now();
        if self.status == TimerStatus::Paused {
            self.pause_marks.push(now);
        }

        let elapsed = (now - paused_total(&self.pause_marks)) - start_instant;
        self.elapsed = Some(elapsed);
        self.start_instant = None;
        self.status = TimerStatus::Inactive;
        self.pause_marks.clear();
        debug!("timer ended, elapsed {elapsed}s");
        Ok(elapsed)
    }

    /// Elapsed seconds so far. A pause that is still open is not subtracted.
    pub fn progress(&self) -> Result<f64> {
        self.progress_with(ProgressMode::AsRecorded)
    }

    pub fn progress_with(&self, mode: ProgressMode) -> Result<f64> {
        let start_instant = self.start_instant.ok_or(TimerStateError::NotRunning)?;
        let now = self.clock.now();
        let closes_pause =
            mode == ProgressMode::CloseOpenPause && self.status == TimerStatus::Paused;
        let paused = if closes_pause {
            // close the pause the way `end` would, without touching the marks
            let mut marks = self.pause_marks.clone();
            marks.push(now);
            paused_total(&marks)
        } else {
            paused_total(&self.pause_marks)
        };
        Ok((now - paused) - start_instant)
    }

    /// Elapsed seconds of the last finished session.
    pub fn recall(&self) -> Result<f64> {
        self.elapsed.ok_or(TimerStateError::NotEnded)
    }

    pub fn timestamp(&self, strip: bool) -> Result<String> {
        let elapsed = self.recall()?;
        Ok(format::format_elapsed(elapsed, strip))
    }

    /// Print the elapsed-time line to stdout.
    pub fn report(&self, strip: bool) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.report_to(strip, &mut handle)
    }

    pub fn report_to<W: Write>(&self, strip: bool, out: &mut W) -> Result<(), ReportError> {
        let elapsed = self.recall()?;
        writeln!(out, "{}", format::report_line(elapsed, strip))?;
        Ok(())
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            running: self.is_active(),
            elapsed: self.elapsed,
            pause_marks: self.pause_marks.clone(),
        }
    }
}

impl<C: Clock> fmt::Display for IntervalTimer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timer status: {}", self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    fn timer(readings: &[f64]) -> IntervalTimer<FakeClock> {
        IntervalTimer::with_clock(FakeClock::new(readings.iter().copied()))
    }

    #[test]
    fn end_without_pauses() {
        let mut timer = timer(&[100.0, 100.01]);
        let elapsed = timer.end().unwrap();
        assert!((elapsed - 0.01).abs() < 1e-9);
        assert_eq!(timer.status(), TimerStatus::Inactive);
        assert!(!timer.is_active());
    }

    #[test]
    fn pause_resume_is_excluded() {
        // start 0, pause 1, resume 4, end 6
        let mut timer = timer(&[0.0, 1.0, 4.0, 6.0]);
        timer.pause().unwrap();
        assert_eq!(timer.status(), TimerStatus::Paused);
        timer.resume().unwrap();
        assert_eq!(timer.status(), TimerStatus::Resumed);
        assert_eq!(timer.end().unwrap(), 3.0);
        assert!(timer.pause_marks().is_empty());
    }

    #[test]
    fn several_pauses_are_summed() {
        let mut timer = timer(&[0.0, 1.0, 2.0, 3.0, 5.0, 10.0]);
        timer.pause().unwrap();
        timer.resume().unwrap();
        timer.pause().unwrap();
        timer.resume().unwrap();
        assert_eq!(timer.end().unwrap(), 7.0);
    }

    #[test]
    fn end_while_paused_closes_pause() {
        let mut timer = timer(&[0.0, 2.0, 9.0]);
        timer.pause().unwrap();
        assert_eq!(timer.end().unwrap(), 2.0);
        assert_eq!(timer.recall().unwrap(), 2.0);
    }

    #[test]
    fn double_pause_pairs_by_position() {
        // marks [1, 2, 5]: only (1, 2) forms a pair, 5 is left unpaired
        let mut timer = timer(&[0.0, 1.0, 2.0, 5.0, 10.0]);
        timer.pause().unwrap();
        timer.pause().unwrap();
        timer.resume().unwrap();
        assert_eq!(timer.pause_marks(), &[1.0, 2.0, 5.0]);
        assert_eq!(timer.end().unwrap(), 9.0);
    }

    #[test]
    fn immediate_double_pause_adds_nothing() {
        let mut timer = timer(&[0.0, 1.0, 1.0, 10.0]);
        timer.pause().unwrap();
        timer.pause().unwrap();
        // still paused: end appends a closing mark, giving [1, 1, 10]
        assert_eq!(timer.end().unwrap(), 10.0);
    }

    #[test]
    fn progress_ignores_open_pause() {
        let mut timer = timer(&[0.0, 2.0, 5.0, 5.0]);
        timer.pause().unwrap();
        assert_eq!(timer.progress().unwrap(), 5.0);
        assert_eq!(
            timer.progress_with(ProgressMode::CloseOpenPause).unwrap(),
            2.0
        );
        assert_eq!(timer.status(), TimerStatus::Paused);
        assert_eq!(timer.pause_marks(), &[2.0]);
    }

    #[test]
    fn close_open_pause_matches_end_after_stray_resume() {
        // a resume with no pause leaves one mark, but nothing is open
        let mut timer = timer(&[0.0, 2.0, 10.0, 10.0]);
        timer.resume().unwrap();
        let progress = timer.progress_with(ProgressMode::CloseOpenPause).unwrap();
        assert_eq!(progress, 10.0);
        assert_eq!(timer.end().unwrap(), progress);
    }

    #[test]
    fn close_open_pause_matches_end_after_resume_then_pause() {
        // marks [2, 3] plus the closing reading: only (2, 3) pairs up
        let mut timer = timer(&[0.0, 2.0, 3.0, 10.0, 10.0]);
        timer.resume().unwrap();
        timer.pause().unwrap();
        let progress = timer.progress_with(ProgressMode::CloseOpenPause).unwrap();
        assert_eq!(progress, 9.0);
        assert_eq!(timer.end().unwrap(), progress);
    }

    #[test]
    fn progress_is_non_decreasing() {
        let mut timer = timer(&[0.0, 1.0, 2.0, 3.0, 4.0, 6.0]);
        let first = timer.progress().unwrap();
        timer.pause().unwrap();
        timer.resume().unwrap();
        let second = timer.progress().unwrap();
        let third = timer.progress().unwrap();
        assert_eq!(first, 1.0);
        assert_eq!(second, 3.0);
        assert_eq!(third, 5.0);
    }

    #[test]
    fn progress_after_end_fails() {
        let mut timer = timer(&[0.0, 1.0]);
        timer.end().unwrap();
        assert_eq!(timer.progress(), Err(TimerStateError::NotRunning));
        assert_eq!(timer.end(), Err(TimerStateError::NotRunning));
    }

    #[test]
    fn recall_before_end_fails() {
        let timer = timer(&[0.0]);
        assert_eq!(timer.recall(), Err(TimerStateError::NotEnded));
        assert_eq!(timer.timestamp(false), Err(TimerStateError::NotEnded));
    }

    #[test]
    fn start_before_end_fails_without_side_effects() {
        let mut timer = timer(&[0.0, 1.0]);
        assert_eq!(timer.start(), Err(TimerStateError::NotEnded));
        assert!(timer.is_active());
        assert_eq!(timer.status(), TimerStatus::Active);
    }

    #[test]
    fn pause_and_resume_after_end_fail() {
        let mut timer = timer(&[0.0, 1.0]);
        timer.end().unwrap();
        assert_eq!(timer.pause(), Err(TimerStateError::Inactive));
        assert_eq!(timer.resume(), Err(TimerStateError::Inactive));
        assert!(timer.pause_marks().is_empty());
    }

    #[test]
    fn restart_clears_previous_session() {
        let mut timer = timer(&[0.0, 3.0, 10.0, 10.5]);
        assert_eq!(timer.end().unwrap(), 3.0);
        timer.start().unwrap();
        assert_eq!(timer.recall(), Err(TimerStateError::NotEnded));
        assert_eq!(timer.status(), TimerStatus::Active);
        assert_eq!(timer.end().unwrap(), 0.5);
    }

    #[test]
    fn resume_without_pause_is_accepted() {
        // marks [2, 3] pair up even though the first was a resume
        let mut timer = timer(&[0.0, 2.0, 3.0, 10.0]);
        timer.resume().unwrap();
        timer.pause().unwrap();
        assert_eq!(timer.status(), TimerStatus::Paused);
        // paused: end adds 10 -> [2, 3, 10], pairs (2, 3)
        assert_eq!(timer.end().unwrap(), 9.0);
    }

    #[test]
    fn report_strips_fraction() {
        let mut timer = timer(&[0.0, 3.9]);
        timer.end().unwrap();

        let mut out = Vec::new();
        timer.report_to(true, &mut out).unwrap();
        timer.report_to(false, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Elapsed time (H:MM:SS): 0:00:03\nElapsed time (H:MM:SS.ff): 0:00:03.900000\n"
        );
        assert_eq!(timer.timestamp(true).unwrap(), "0:00:03");
        assert_eq!(timer.timestamp(false).unwrap(), "0:00:03.900000");
    }

    #[test]
    fn report_before_end_fails() {
        let timer = timer(&[0.0]);
        let mut out = Vec::new();
        let err = timer.report_to(false, &mut out).unwrap_err();
        assert!(matches!(err, ReportError::State(TimerStateError::NotEnded)));
        assert!(out.is_empty());
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn report_surfaces_write_failure() {
        let mut timer = timer(&[0.0, 1.0]);
        timer.end().unwrap();
        let err = timer.report_to(false, &mut BrokenPipe).unwrap_err();
        assert!(matches!(err, ReportError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(timer.recall().unwrap(), 1.0);
    }

    #[test]
    fn display_shows_status() {
        let mut timer = timer(&[0.0, 1.0, 2.0]);
        assert_eq!(timer.to_string(), "Timer status: Active");
        timer.pause().unwrap();
        assert_eq!(timer.to_string(), "Timer status: Paused");
        timer.resume().unwrap();
        assert_eq!(timer.to_string(), "Timer status: Active (resumed)");
    }

    #[test]
    fn snapshot_serializes_status_text() {
        let mut timer = timer(&[0.0, 1.0, 2.0]);
        timer.pause().unwrap();
        let json = serde_json::to_value(timer.snapshot()).unwrap();
        assert_eq!(json["status"], "Paused");
        assert_eq!(json["running"], true);
        assert!(json["elapsed"].is_null());
        assert_eq!(json["pause_marks"], serde_json::json!([1.0]));
    }
}

//! Elapsed-time rendering.
//!
//! Durations are shown as `H:MM:SS`, with a `.ffffff` microsecond suffix
//! whenever the value is not a whole number of seconds. Hours are not
//! wrapped into days.

const MICROS_PER_SEC: u64 = 1_000_000;

pub const FULL_LABEL: &str = "Elapsed time (H:MM:SS.ff):";
pub const STRIPPED_LABEL: &str = "Elapsed time (H:MM:SS):";

/// Drop the fractional part, rounding toward zero.
pub fn strip_seconds(seconds: f64) -> f64 {
    seconds.trunc()
}

pub fn format_duration(seconds: f64) -> String {
    let sign = if seconds < 0.0 { "-" } else { "" };
    let total_micros = (seconds.abs() * MICROS_PER_SEC as f64).round() as u64;

    let micros = total_micros % MICROS_PER_SEC;
    let total_secs = total_micros / MICROS_PER_SEC;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if micros == 0 {
        format!("{}{}:{:02}:{:02}", sign, hours, minutes, secs)
    } else {
        format!("{}{}:{:02}:{:02}.{:06}", sign, hours, minutes, secs, micros)
    }
}

/// Duration as shown by `report` and `timestamp`, optionally stripped.
pub fn format_elapsed(seconds: f64, strip: bool) -> String {
    if strip {
        format_duration(strip_seconds(seconds))
    } else {
        format_duration(seconds)
    }
}

/// The full console line, label included.
pub fn report_line(seconds: f64, strip: bool) -> String {
    let label = if strip { STRIPPED_LABEL } else { FULL_LABEL };
    format!("{} {}", label, format_elapsed(seconds, strip))
}

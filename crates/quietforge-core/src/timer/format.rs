//! Display helpers for countdowns, catalog badges and the stopwatch.

/// Length of one lap of the stopwatch progress ring.
pub const STOPWATCH_LAP_SECS: f64 = 60.0 * 60.0;

/// Countdown text, `m:ss`. Minutes are not wrapped into hours.
pub fn format_remaining(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Catalog badge: rounded minutes, never below one.
pub fn badge_minutes(total_secs: u64) -> String {
    let mins = ((total_secs as f64 / 60.0).round() as u64).max(1);
    format!("{mins} min")
}

/// Stopwatch text, `hh:mm:ss.cc`. Negative and non-finite input reads as zero.
pub fn format_stopwatch(elapsed_secs: f64) -> String {
    let ms = if elapsed_secs.is_finite() {
        (elapsed_secs * 1000.0).max(0.0).floor() as u64
    } else {
        0
    };
    let hh = ms / 3_600_000;
    let mm = (ms % 3_600_000) / 60_000;
    let ss = (ms % 60_000) / 1000;
    let cs = (ms % 1000) / 10;
    format!("{hh:02}:{mm:02}:{ss:02}.{cs:02}")
}

/// Fraction of the current stopwatch lap, 0.0 .. 1.0.
pub fn lap_progress(elapsed_secs: f64) -> f64 {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return 0.0;
    }
    (elapsed_secs % STOPWATCH_LAP_SECS) / STOPWATCH_LAP_SECS
}

/// Text progress bar for terminals.
pub fn progress_bar(progress: f64, width: usize) -> String {
    let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    let filled = (p * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

//! Terminal host: frame clock, keyboard commands and the bell cue player.
//!
//! The core never schedules itself. The host owns a tokio interval that
//! stands in for a display refresh callback and drops it whenever the
//! session stops wanting frames.

use std::io::Write;
use std::time::Duration;

use quietforge_core::{CueError, CuePlayer};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Scaled milliseconds since the host started.
pub struct FrameClock {
    origin: Instant,
    scale: f64,
}

impl FrameClock {
    pub fn new(scale: f64) -> Self {
        Self {
            origin: Instant::now(),
            scale,
        }
    }

    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0 * self.scale
    }
}

/// New frame ticker. Late frames are skipped rather than bunched up.
pub fn frame_ticker(interval_ms: u64) -> Interval {
    let mut ticker = time::interval(Duration::from_millis(interval_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}

/// Wait for the next frame, or forever when no ticker is scheduled.
pub async fn next_frame(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// One line typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Pause,
    Resume,
    Quit,
}

impl KeyCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "p" | "pause" => Some(KeyCommand::Pause),
            "r" | "resume" => Some(KeyCommand::Resume),
            "q" | "quit" | "exit" => Some(KeyCommand::Quit),
            _ => None,
        }
    }
}

pub type StdinLines = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> StdinLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Single-threaded runtime for the frame loop.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
}

/// Rewrite the status line in place.
pub fn status_line(text: &str) {
    let mut out = std::io::stdout();
    let _ = write!(out, "\r\x1b[2K{text}");
    let _ = out.flush();
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl TerminalBell {
    fn ring(times: usize) -> Result<(), CueError> {
        let mut err = std::io::stderr();
        err.write_all("\x07".repeat(times).as_bytes())?;
        err.flush()?;
        Ok(())
    }
}

impl CuePlayer for TerminalBell {
    fn play_transition_cue(&self) -> Result<(), CueError> {
        Self::ring(1)
    }

    fn play_completion_cue(&self) -> Result<(), CueError> {
        Self::ring(3)
    }
}

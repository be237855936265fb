use clap::Args;
use quietforge_core::timer::format::{format_stopwatch, lap_progress, progress_bar};
use quietforge_core::{Config, RitualClock};

use crate::host::{self, FrameClock, KeyCommand};

#[derive(Args)]
pub struct StopwatchArgs {
    /// Stop after this many seconds
    #[arg(long = "for")]
    for_secs: Option<f64>,
    /// Time multiplier, overrides timer.time_scale
    #[arg(long)]
    speed: Option<f64>,
}

pub fn run(args: StopwatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let scale = args.speed.unwrap_or(config.timer.time_scale);
    if !(scale.is_finite() && scale > 0.0) {
        return Err(format!("invalid speed: {scale}").into());
    }
    let mut clock = match args.for_secs {
        Some(limit) if limit.is_finite() && limit > 0.0 => RitualClock::new(limit),
        Some(limit) => return Err(format!("invalid duration: {limit}").into()),
        None => RitualClock::unbounded(),
    };
    let frame_ms = config.timer.frame_interval_ms;

    let rt = host::runtime()?;
    rt.block_on(async {
        let frames = FrameClock::new(scale);
        let mut lines = host::stdin_lines();
        let mut stdin_open = true;

        clock.start(frames.now_ms());
        let mut ticker = Some(host::frame_ticker(frame_ms));
        let mut last_line = String::new();

        loop {
            tokio::select! {
                _ = host::next_frame(&mut ticker) => {
                    let elapsed = clock.tick(frames.now_ms());
                    let line = format!(
                        "{} {}",
                        format_stopwatch(elapsed.fine_secs),
                        progress_bar(lap_progress(elapsed.fine_secs), 20)
                    );
                    if line != last_line {
                        host::status_line(&line);
                        last_line = line;
                    }
                    if elapsed.fine_secs >= clock.ceiling_secs() {
                        break;
                    }
                }
                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(text)) => match KeyCommand::parse(&text) {
                            Some(KeyCommand::Pause) => {
                                clock.pause(frames.now_ms());
                                ticker = None;
                            }
                            Some(KeyCommand::Resume) => {
                                if clock.start(frames.now_ms()) {
                                    ticker = Some(host::frame_ticker(frame_ms));
                                }
                            }
                            Some(KeyCommand::Quit) => break,
                            None => {}
                        },
                        Ok(None) | Err(_) => stdin_open = false,
                    }
                }
            }

            if !stdin_open && ticker.is_none() {
                break;
            }
        }
    });
    rt.shutdown_background();

    println!();
    println!("{}", format_stopwatch(clock.elapsed().fine_secs));
    Ok(())
}

use clap::Subcommand;
use quietforge_core::{compute_phase, BreathPattern};

#[derive(Subcommand)]
pub enum BreathAction {
    /// List breathing patterns
    List,
    /// Sample a pattern's glow state over time
    Sample {
        /// Pattern ID (e.g. "fourFourSix_paused", "box_4_4_4_4")
        pattern: String,
        /// Seconds between samples
        #[arg(long, default_value = "0.5")]
        step: f64,
        /// Number of cycles to sample
        #[arg(long, default_value = "1")]
        cycles: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: BreathAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        BreathAction::List => {
            for pattern in BreathPattern::ALL {
                let phases: Vec<String> = pattern
                    .steps()
                    .iter()
                    .map(|s| format!("{}:{}", s.phase.map(|p| p.label()).unwrap_or("pause"), s.secs))
                    .collect();
                println!("{:<22} {:>5}s  {}", pattern.id(), pattern.cycle_secs(), phases.join(" "));
            }
        }
        BreathAction::Sample {
            pattern,
            step,
            cycles,
            json,
        } => {
            let pattern: BreathPattern = pattern.parse()?;
            if !(step.is_finite() && step > 0.0) {
                return Err(format!("invalid step: {step}").into());
            }

            let end = pattern.cycle_secs() * f64::from(cycles.max(1));
            let mut samples = Vec::new();
            let mut i: u32 = 0;
            loop {
                let t = f64::from(i) * step;
                if t > end {
                    break;
                }
                samples.push((t, compute_phase(pattern, t)));
                i += 1;
            }

            if json {
                let rows: Vec<_> = samples
                    .iter()
                    .map(|(t, s)| serde_json::json!({ "t": t, "state": s }))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for (t, s) in samples {
                    let label = s.phase.map(|p| p.label()).unwrap_or("-");
                    println!("{t:>7.2}  {label:<7} scale={:.3} opacity={:.3}", s.scale, s.opacity);
                }
            }
        }
    }
    Ok(())
}

use clap::Subcommand;
use quietforge_core::breath::BreathState;
use quietforge_core::journal::SuiteJournalSink;
use quietforge_core::timer::format::{badge_minutes, format_remaining, progress_bar};
use quietforge_core::{
    Catalog, Config, Event, FileSuiteBus, GatedCuePlayer, JournalStore, NullJournalSink, Ritual,
    RitualSession, SessionFrame, SilentCuePlayer,
};
use serde_json::json;

use crate::host::{self, FrameClock, KeyCommand, TerminalBell};

#[derive(Subcommand)]
pub enum RitualAction {
    /// List available rituals
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a ritual's sections as JSON
    Show {
        /// Ritual ID
        id: String,
    },
    /// Print the frame a ritual shows at a given elapsed time
    Preview {
        /// Ritual ID
        id: String,
        /// Elapsed seconds since the ritual started
        #[arg(long, default_value = "0")]
        at: f64,
    },
    /// Run a ritual in the terminal (type p, r or q then Enter)
    Run {
        /// Ritual ID
        id: String,
        /// Time multiplier, overrides timer.time_scale
        #[arg(long)]
        speed: Option<f64>,
        /// Disable sound cues for this run
        #[arg(long)]
        no_sound: bool,
        /// Print events as JSON lines instead of a status line
        #[arg(long)]
        json: bool,
    },
}

pub fn load_catalog(config: &Config) -> Result<Catalog, Box<dyn std::error::Error>> {
    Ok(Catalog::load(config.rituals_path().as_deref())?)
}

pub fn run(action: RitualAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let catalog = load_catalog(&config)?;

    match action {
        RitualAction::List { json } => {
            if json {
                let items: Vec<_> = catalog
                    .iter()
                    .map(|r| {
                        json!({
                            "id": r.id(),
                            "name": r.name(),
                            "total_secs": r.total_secs(),
                            "description": r.definition().description,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for r in catalog.iter() {
                    println!("{:<20} {:<22} {}", r.id(), r.name(), badge_minutes(r.total_secs()));
                }
            }
        }
        RitualAction::Show { id } => {
            let ritual = catalog.require(&id)?;
            println!("{}", serde_json::to_string_pretty(ritual)?);
        }
        RitualAction::Preview { id, at } => {
            let ritual = catalog.require(&id)?.clone();
            let mut session = RitualSession::new(ritual, SilentCuePlayer, NullJournalSink);
            session.start(0.0);
            session.tick(at * 1000.0);
            println!("{}", serde_json::to_string_pretty(&session.frame())?);
        }
        RitualAction::Run {
            id,
            speed,
            no_sound,
            json,
        } => {
            let ritual = catalog.require(&id)?.clone();
            let scale = speed.unwrap_or(config.timer.time_scale);
            if !(scale.is_finite() && scale > 0.0) {
                return Err(format!("invalid speed: {scale}").into());
            }
            run_session(ritual, &config, scale, !no_sound, json)?;
        }
    }
    Ok(())
}

fn run_session(
    ritual: Ritual,
    config: &Config,
    scale: f64,
    sound: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let audio = &config.audio;
    let sound = sound && audio.enabled;
    let cues = GatedCuePlayer::new(
        TerminalBell,
        sound && audio.transition_cue,
        sound && audio.completion_cue,
    );

    let store = JournalStore::open()?;
    let bus = if config.journal.propagate_to_suite {
        Some(FileSuiteBus::new(config.suite_bus_path()?))
    } else {
        None
    };
    let sink = SuiteJournalSink::new(&store, bus)
        .with_intention_rituals(config.suite.intention_rituals.clone());

    let prompt = ritual.journal_prompt().map(str::to_string);
    let mut session = RitualSession::new(ritual, cues, &sink);
    let frame_ms = config.timer.frame_interval_ms;

    let rt = host::runtime()?;
    let note = rt.block_on(async {
        let clock = FrameClock::new(scale);
        let mut lines = host::stdin_lines();
        let mut stdin_open = true;

        emit(session.start(clock.now_ms()), json);
        let mut ticker = Some(host::frame_ticker(frame_ms));
        let mut last_line = String::new();

        loop {
            tokio::select! {
                _ = host::next_frame(&mut ticker) => {
                    let event = session.tick(clock.now_ms());
                    if !json {
                        let line = render(&session.frame());
                        if line != last_line {
                            host::status_line(&line);
                            last_line = line;
                        }
                    }
                    emit(event, json);
                }
                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(text)) => match KeyCommand::parse(&text) {
                            Some(KeyCommand::Pause) => emit(session.pause(clock.now_ms()), json),
                            Some(KeyCommand::Resume) => emit(session.start(clock.now_ms()), json),
                            Some(KeyCommand::Quit) => emit(session.request_exit(clock.now_ms()), json),
                            None => {}
                        },
                        Ok(None) | Err(_) => stdin_open = false,
                    }
                }
            }

            // Paused or finished: no frame may be scheduled.
            if !session.wants_frames() {
                ticker = None;
            } else if ticker.is_none() {
                ticker = Some(host::frame_ticker(frame_ms));
            }

            if session.state().is_terminal() {
                break;
            }
            if !stdin_open && ticker.is_none() {
                // Paused with nobody left to resume it.
                emit(session.request_exit(clock.now_ms()), json);
                break;
            }
        }

        if !json {
            println!();
        }

        match (session.journal_entry_id(), stdin_open) {
            (Some(_), true) => {
                if let Some(p) = &prompt {
                    println!("{p}");
                }
                println!("Reflection (blank to skip):");
                match lines.next_line().await {
                    Ok(Some(text)) if !text.trim().is_empty() => Some(text.trim().to_string()),
                    _ => None,
                }
            }
            _ => None,
        }
    });
    // A blocked stdin read must not hold the process open.
    rt.shutdown_background();

    if let (Some(entry_id), Some(note)) = (session.journal_entry_id(), note) {
        sink.record_reflection(entry_id, &note)?;
        if !json {
            println!("reflection saved");
        }
    }
    Ok(())
}

fn emit(event: Option<Event>, json: bool) {
    let Some(event) = event else { return };
    if json {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
        }
        return;
    }
    match event {
        Event::SectionEntered { label, .. } => {
            println!();
            println!("-> {label}");
        }
        Event::SessionPaused { .. } => {
            println!();
            println!("paused (r to resume, q to quit)");
        }
        Event::SessionCompleted { entry_id, .. } => {
            println!();
            println!("complete. journal entry {entry_id}");
        }
        Event::SessionExited { .. } => {
            println!();
            println!("exited");
        }
        _ => {}
    }
}

fn render(frame: &SessionFrame) -> String {
    let mut line = format!(
        "{} {} {}",
        format_remaining(frame.remaining_secs),
        progress_bar(frame.progress, 20),
        frame.section_label
    );
    if let Some(breath) = &frame.breath {
        line.push_str("  ");
        line.push_str(&breath_gauge(breath));
    }
    if let Some(prompt) = &frame.prompt {
        line.push_str("  ");
        line.push_str(prompt);
    }
    line
}

fn breath_gauge(breath: &BreathState) -> String {
    let label = breath.phase.map(|p| p.label()).unwrap_or("");
    let width = (breath.scale * 10.0).round() as usize;
    format!("{:<7} {}", label, "o".repeat(width.max(1)))
}

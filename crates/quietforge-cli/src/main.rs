use clap::{Parser, Subcommand};

mod commands;
mod host;

#[derive(Parser)]
#[command(name = "quietforge", version, about = "Quiet Forge guided-ritual timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse and run rituals
    Ritual {
        #[command(subcommand)]
        action: commands::ritual::RitualAction,
    },
    /// Inspect breathing patterns
    Breath {
        #[command(subcommand)]
        action: commands::breath::BreathAction,
    },
    /// Journal of completed rituals
    Journal {
        #[command(subcommand)]
        action: commands::journal::JournalAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Free-running stopwatch
    Stopwatch(commands::stopwatch::StopwatchArgs),
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("QUIETFORGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Ritual { action } => commands::ritual::run(action),
        Commands::Breath { action } => commands::breath::run(action),
        Commands::Journal { action } => commands::journal::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Stopwatch(args) => commands::stopwatch::run(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

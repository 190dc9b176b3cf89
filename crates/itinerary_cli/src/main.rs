//! Interactive itinerary editor.
//!
//! # Responsibility
//! - Resolve configuration from flags and environment, start logging.
//! - Run a line-driven editing session on stdin/stdout.

mod commands;

use clap::Parser;
use commands::{parse_command, Reply, Shell};
use itinerary_core::{
    init_logging, sample_itinerary, ConfigOverrides, EditorConfig, EditorSession,
};
use log::{info, warn};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "itinerary", version, about = "Plan a trip as an ordered timeline of events")]
struct Cli {
    /// Log level: trace|debug|info|warn|error.
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Directory that receives exported files.
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Export upscale factor (1-4).
    #[arg(long)]
    scale: Option<u32>,

    /// Start with the sample Paris itinerary.
    #[arg(long)]
    sample: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let (mut config, warnings) = EditorConfig::from_env();
    if let Err(err) = config.apply(ConfigOverrides {
        log_level: cli.log_level,
        log_dir: cli.log_dir,
        export_dir: cli.export_dir,
        scale: cli.scale,
    }) {
        eprintln!("error: {err}");
        return ExitCode::from(2);
    }

    if let Err(err) = init_logging(&config.log) {
        eprintln!("warning: file logging disabled: {err}");
    }
    for warning in &warnings {
        warn!(
            "event=config_ignored module=cli status=warn variable={}",
            warning.variable
        );
        eprintln!("warning: {warning}");
    }

    let mut session = EditorSession::new(&config.export);
    if cli.sample {
        if let Err(err) = session.seed(sample_itinerary()) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }
    info!(
        "event=session_start module=cli status=ok events={} scale={}",
        session.timeline().len(),
        config.export.scale
    );

    match run(Shell::new(session)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(mut shell: Shell) -> std::io::Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    writeln!(
        stdout,
        "itinerary {}; type `help` for commands",
        itinerary_core::core_version()
    )?;

    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "{}", shell.prompt())?;
        stdout.flush()?;
        let Some(line) = lines.next().transpose()? else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(stdout, "error: {message}")?;
                continue;
            }
        };
        match shell.execute(command) {
            Ok(Reply::Text(text)) => writeln!(stdout, "{text}")?,
            Ok(Reply::Quit) => break,
            Err(message) => writeln!(stdout, "error: {message}")?,
        }
    }

    info!(
        "event=session_end module=cli status=ok events={}",
        shell.session().timeline().len()
    );
    Ok(())
}

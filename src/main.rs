use clap::Parser;
use log::{debug, info};
use simpler_timer::clock::{Clock, SystemClock};
use simpler_timer::config::Config;
use simpler_timer::error::ReportError;
use simpler_timer::format::format_elapsed;
use simpler_timer::timer::{IntervalTimer, ProgressMode};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Interactive stopwatch: type commands on stdin while you work
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a .toml configuration file (defaults to ~/.config/simpler-timer.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Truncate reported durations to whole seconds
    #[arg(short, long)]
    strip: bool,

    /// Print a JSON snapshot of the timer after it ends
    #[arg(short, long)]
    json: bool,
}

/// Effective options after merging the config file with the command line
#[derive(Debug, Clone, Copy, Default)]
struct Settings {
    strip: bool,
    json: bool,
    progress_mode: ProgressMode,
}

impl Settings {
    fn new(config: &Config, args: &Args) -> Self {
        Settings {
            strip: args.strip || config.report.strip,
            json: args.json || config.report.json,
            progress_mode: config.progress.mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Pause,
    Resume,
    End,
    Progress,
    Recall,
    Report,
    Timestamp,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(Command::Start),
            "pause" | "p" => Ok(Command::Pause),
            "resume" | "r" => Ok(Command::Resume),
            "end" | "e" => Ok(Command::End),
            "progress" => Ok(Command::Progress),
            "recall" => Ok(Command::Recall),
            "report" => Ok(Command::Report),
            "timestamp" => Ok(Command::Timestamp),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command {:?}; type help", other)),
        }
    }
}

const HELP: &str = "\
commands:
  pause | p      pause the running timer
  resume | r     resume after a pause
  progress       elapsed time so far
  end | e        stop the timer and report
  start          restart after end
  recall         elapsed seconds of the last session
  report         print the elapsed-time line
  timestamp      print the elapsed time only
  status         show the timer status
  quit | q       end (if running) and exit";

/// Run one command. Timer errors go to `err`; only I/O failures abort.
fn execute<C: Clock, W: Write, E: Write>(
    command: Command,
    timer: &mut IntervalTimer<C>,
    settings: &Settings,
    out: &mut W,
    err: &mut E,
) -> Result<(), Box<dyn Error>> {
    let outcome = match command {
        Command::Start => timer.start().map(|()| writeln!(out, "{}", timer)),
        Command::Pause => timer.pause().map(|()| writeln!(out, "{}", timer)),
        Command::Resume => timer.resume().map(|()| writeln!(out, "{}", timer)),
        Command::Progress => timer
            .progress_with(settings.progress_mode)
            .map(|secs| writeln!(out, "Progress: {}", format_elapsed(secs, settings.strip))),
        Command::End => match timer.end() {
            Ok(_) => {
                timer.report_to(settings.strip, out)?;
                if settings.json {
                    writeln!(out, "{}", serde_json::to_string(&timer.snapshot())?)?;
                }
                Ok(Ok(()))
            }
            Err(e) => Err(e),
        },
        Command::Recall => timer.recall().map(|secs| writeln!(out, "{}", secs)),
        Command::Report => match timer.report_to(settings.strip, out) {
            Ok(()) => Ok(Ok(())),
            Err(ReportError::State(e)) => Err(e),
            Err(e) => return Err(e.into()),
        },
        Command::Timestamp => timer
            .timestamp(settings.strip)
            .map(|stamp| writeln!(out, "{}", stamp)),
        Command::Status => Ok(writeln!(out, "{}", timer)),
        Command::Help => Ok(writeln!(out, "{}", HELP)),
        Command::Quit => Ok(Ok(())),
    };

    match outcome {
        Ok(written) => written?,
        Err(e) => writeln!(err, "error: {}", e)?,
    }
    Ok(())
}

/// Read commands line by line until `quit` or end of input. A timer that is
/// still running at that point is ended and reported.
fn run_session<C: Clock, R: BufRead, W: Write, E: Write>(
    timer: &mut IntervalTimer<C>,
    settings: &Settings,
    input: R,
    out: &mut W,
    err: &mut E,
) -> Result<(), Box<dyn Error>> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => {
                debug!("command {:?}", command);
                execute(command, timer, settings, out, err)?;
            }
            Err(e) => writeln!(err, "{}", e)?,
        }
    }

    if timer.is_active() {
        execute(Command::End, timer, settings, out, err)?;
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();

    let config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load the config file: {}", e);
            std::process::exit(1);
        }
    };
    let settings = Settings::new(&config, &args);
    info!("settings: {:?}", settings);

    let mut timer = IntervalTimer::with_clock(SystemClock);
    println!("{} (type help for commands)", timer);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stderr = io::stderr();
    if let Err(e) = run_session(
        &mut timer,
        &settings,
        stdin.lock(),
        &mut stdout.lock(),
        &mut stderr.lock(),
    ) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

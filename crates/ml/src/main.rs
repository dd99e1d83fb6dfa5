//! ml - macroloop CLI
//!
//! Record a desktop macro once, replay it in a loop until a checkpoint
//! screenshot no longer matches.
//!
//! Supported: macOS, Windows

use anyhow::{bail, Result};
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use macroloop::prelude::*;
use macroloop::recorder::RecordingSummary;

#[derive(Parser)]
#[command(name = "ml")]
#[command(about = "macroloop - record a desktop macro and replay it in a loop")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, value_enum, global = true, default_value_t = CliLogLevel::Warn)]
    log_level: CliLogLevel,

    /// Key that stops recording and replay
    #[arg(long, global = true, default_value = "enter", value_parser = parse_key)]
    stop_key: Key,

    /// Key that takes a screenshot checkpoint while recording
    #[arg(long, global = true, default_value = "esc", value_parser = parse_key)]
    checkpoint_key: Key,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new macro into DIR
    Record {
        dir: PathBuf,
        /// Start replaying right after recording
        #[arg(long)]
        run: bool,
    },
    /// Replay the macro in DIR until stopped or a checkpoint differs
    Run { dir: PathBuf },
    /// Show macro info
    Show {
        dir: PathBuf,
        #[arg(long)]
        all: bool,
    },
    /// List macros under ROOT
    List {
        #[arg(default_value = ".")]
        root: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliLogLevel::Error => write!(f, "error"),
            CliLogLevel::Warn => write!(f, "warn"),
            CliLogLevel::Info => write!(f, "info"),
            CliLogLevel::Debug => write!(f, "debug"),
            CliLogLevel::Trace => write!(f, "trace"),
        }
    }
}

fn parse_key(s: &str) -> std::result::Result<Key, String> {
    s.parse::<Key>().map_err(|e| e.message)
}

#[derive(Serialize)]
struct Output<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<Error>,
}

impl<T: Serialize> Output<T> {
    fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
    fn err(e: Error) -> Output<()> {
        Output { success: false, data: None, error: Some(e) }
    }
}

fn print_json<T: Serialize>(output: &T) {
    match serde_json::to_string_pretty(output) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error: could not encode output: {}", e),
    }
}

fn init_logging(level: CliLogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

// ── Ctrl+C ──────────────────────────────────────────────────────────────────

/// Routes Ctrl+C to the phase that is running; exits when nothing is.
#[derive(Clone, Default)]
struct Interrupt {
    active: Arc<Mutex<Option<CancelToken>>>,
}

impl Interrupt {
    fn install() -> Result<Self> {
        let interrupt = Self::default();
        let active = interrupt.active.clone();
        ctrlc::set_handler(move || match active.lock().as_ref() {
            Some(token) => token.cancel(),
            None => std::process::exit(130),
        })?;
        Ok(interrupt)
    }

    fn phase(&self) -> Phase {
        let token = CancelToken::new();
        *self.active.lock() = Some(token.clone());
        Phase {
            interrupt: self.clone(),
            token,
        }
    }
}

/// Ctrl+C cancels `token` until this is dropped.
struct Phase {
    interrupt: Interrupt,
    token: CancelToken,
}

impl Drop for Phase {
    fn drop(&mut self) {
        *self.interrupt.active.lock() = None;
    }
}

// ── Context ─────────────────────────────────────────────────────────────────

struct Ctx {
    stop_key: Key,
    checkpoint_key: Key,
    json: bool,
    interrupt: Interrupt,
}

impl Ctx {
    /// Human-facing text; moved to stderr when stdout carries JSON.
    fn say(&self, message: impl fmt::Display) {
        if self.json {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }

    fn recorder(&self) -> Recorder {
        Recorder::with_config(RecorderConfig {
            stop_key: self.stop_key.clone(),
            checkpoint_key: self.checkpoint_key.clone(),
            ..Default::default()
        })
    }

    fn replay_config(&self) -> ReplayConfig {
        ReplayConfig {
            stop_key: self.stop_key.clone(),
            ..Default::default()
        }
    }
}

enum Finish {
    Done,
    Aborted,
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    tracing::debug!(stop_key = %cli.stop_key, checkpoint_key = %cli.checkpoint_key, "ml starting");

    let interrupt = match Interrupt::install() {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let ctx = Ctx {
        stop_key: cli.stop_key,
        checkpoint_key: cli.checkpoint_key,
        json: cli.json,
        interrupt,
    };

    let result: Result<Finish> = match cli.command {
        None => interactive(&ctx),
        Some(Commands::Record { dir, run }) => cmd_record(&ctx, &dir, run),
        Some(Commands::Run { dir }) => cmd_run(&ctx, &dir),
        Some(Commands::Show { dir, all }) => cmd_show(&ctx, &dir, all).map(|()| Finish::Done),
        Some(Commands::List { root }) => cmd_list(&ctx, &root).map(|()| Finish::Done),
    };

    match result {
        Ok(Finish::Done) => {}
        Ok(Finish::Aborted) => std::process::exit(2),
        Err(e) => {
            let structured = e.downcast_ref::<Error>();
            if ctx.json {
                if let Some(err) = structured {
                    print_json(&Output::<()>::err(err.clone()));
                }
            }
            eprintln!("Error: {}", e);
            for hint in structured.map(|err| err.suggestions.as_slice()).unwrap_or_default() {
                eprintln!("  hint: {}", hint);
            }
            std::process::exit(1);
        }
    }
}

// ── Prompts ─────────────────────────────────────────────────────────────────

fn prompt(message: &str) -> Result<String> {
    print!("{} ", message);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        bail!("stdin closed");
    }
    Ok(line.trim().to_string())
}

fn confirm(message: &str) -> Result<bool> {
    loop {
        match prompt(&format!("{} [y/n]", message))?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}

/// Key as a user would name it: `enter`, `esc`, `q`.
fn key_label(key: &Key) -> String {
    match key {
        Key::Char(' ') => "space".to_string(),
        Key::Char(c) => c.to_string(),
        Key::Named(k) => k.name().to_string(),
        Key::Code(code) => format!("key code {}", code),
    }
}

// ── Commands ────────────────────────────────────────────────────────────────

/// Guided flow: reuse or record, then replay.
fn interactive(ctx: &Ctx) -> Result<Finish> {
    let reuse = confirm("Would you like to use a previous macro?")?;
    let dir = if reuse {
        prompt("Directory of the macro:")?
    } else {
        prompt("Directory for the new macro:")?
    };
    if dir.is_empty() {
        bail!("no directory given");
    }

    let session = Session::new(&dir, !reuse)?;
    let source = SystemInputSource::new()?;
    let mut screen = SystemScreen::new()?;

    if session.is_fresh() {
        prompt("Press enter to start")?;
        record_into(ctx, &session, &source, &mut screen, true)?;
    }

    prompt("Press enter to start the macro")?;
    replay(ctx, &session, &source, &mut screen)
}

fn cmd_record(ctx: &Ctx, dir: &Path, run: bool) -> Result<Finish> {
    let session = Session::new(dir, true)?;
    let source = SystemInputSource::new()?;
    let mut screen = SystemScreen::new()?;

    let summary = record_into(ctx, &session, &source, &mut screen, false)?;
    if !run {
        if ctx.json {
            print_json(&Output::ok(summary));
        }
        return Ok(Finish::Done);
    }
    replay(ctx, &session, &source, &mut screen)
}

fn cmd_run(ctx: &Ctx, dir: &Path) -> Result<Finish> {
    let session = Session::new(dir, false)?;
    let source = SystemInputSource::new()?;
    let mut screen = SystemScreen::new()?;
    replay(ctx, &session, &source, &mut screen)
}

fn record_into(
    ctx: &Ctx,
    session: &Session,
    source: &SystemInputSource,
    screen: &mut SystemScreen,
    pause: bool,
) -> Result<RecordingSummary> {
    ctx.say("Please click the top left corner of the region");
    let region = session.select_region(source, |corner, point| match corner {
        Corner::TopLeft => ctx.say(format!(
            "Top left at {}. Please click the bottom right corner of the region",
            point
        )),
        Corner::BottomRight => ctx.say(format!("Bottom right at {}", point)),
    })?;

    if pause {
        prompt("Press enter to start listening")?;
    }
    ctx.say(format!(
        "Recording. Press {} to stop listening, {} to take a checkpoint",
        key_label(&ctx.stop_key),
        key_label(&ctx.checkpoint_key)
    ));

    let phase = ctx.interrupt.phase();
    let summary = session.record(
        region,
        &ctx.recorder(),
        source,
        &mut MonotonicClock::new(),
        screen,
        &phase.token,
    )?;
    drop(phase);

    ctx.say(format!(
        "Saved {} actions and {} checkpoints, looping every {:.2}s: {}",
        summary.actions,
        summary.checkpoints,
        summary.period,
        summary.path.display()
    ));
    Ok(summary)
}

fn replay(
    ctx: &Ctx,
    session: &Session,
    source: &SystemInputSource,
    screen: &mut SystemScreen,
) -> Result<Finish> {
    let mut player = session.player(ctx.replay_config())?;
    let mut input = SystemInput::new()?;

    ctx.say(format!(
        "Replaying every {:.2}s. Press {} to stop the macro",
        player.period(),
        key_label(&ctx.stop_key)
    ));

    let phase = ctx.interrupt.phase();
    let outcome = player.run_until_stop_key(
        source,
        Devices {
            input: &mut input,
            screen,
        },
        &mut MonotonicClock::new(),
        &phase.token,
    )?;
    drop(phase);

    let stats = outcome.stats();
    match &outcome {
        ReplayOutcome::Stopped { .. } => ctx.say("Stopped by the user"),
        ReplayOutcome::Aborted { checkpoint, .. } => {
            ctx.say(format!("Unexpected difference found! (checkpoint {})", checkpoint))
        }
    }
    ctx.say(format!(
        "{} actions over {} cycles: {} clicks, {} key presses, {} key releases, {} checkpoints (max lag {:.3}s)",
        stats.actions,
        stats.cycles,
        stats.clicks,
        stats.key_presses,
        stats.key_releases,
        stats.checkpoints,
        stats.max_lag
    ));

    let finish = if outcome.is_aborted() { Finish::Aborted } else { Finish::Done };
    if ctx.json {
        print_json(&Output::ok(outcome));
    }
    Ok(finish)
}

#[derive(Serialize)]
struct StepInfo {
    offset: f64,
    action: String,
}

#[derive(Serialize)]
struct MacroInfo {
    dir: PathBuf,
    region: BoundingBox,
    period: f64,
    actions: usize,
    clicks: usize,
    key_presses: usize,
    key_releases: usize,
    checkpoints: usize,
    reference_images: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<Vec<StepInfo>>,
}

fn cmd_show(ctx: &Ctx, dir: &Path, all: bool) -> Result<()> {
    let session = Session::new(dir, false)?;
    let region = session.region()?;
    let program = session.program()?;

    let count = |kind: ActionKind| program.steps().iter().filter(|s| s.action.kind() == kind).count();
    let info = MacroInfo {
        dir: session.store().dir().to_path_buf(),
        region,
        period: program.period(),
        actions: program.len(),
        clicks: count(ActionKind::Click),
        key_presses: count(ActionKind::KeyPress),
        key_releases: count(ActionKind::KeyRelease),
        checkpoints: program.checkpoint_total(),
        reference_images: session.store().checkpoints()?,
        steps: all.then(|| {
            program
                .steps()
                .iter()
                .map(|s| StepInfo {
                    offset: s.offset,
                    action: s.action.to_string(),
                })
                .collect()
        }),
    };

    if ctx.json {
        print_json(&Output::ok(info));
        return Ok(());
    }

    println!("Macro: {}", info.dir.display());
    println!("Region: {} ({}x{})", info.region, info.region.width(), info.region.height());
    println!("Period: {:.3}s", info.period);
    println!(
        "\nSummary: {} actions, {} clicks, {} key presses, {} key releases, {} checkpoints",
        info.actions, info.clicks, info.key_presses, info.key_releases, info.checkpoints
    );
    if info.reference_images.len() != info.checkpoints {
        println!(
            "Warning: {} checkpoints but {} reference images on disk",
            info.checkpoints,
            info.reference_images.len()
        );
    }
    if let Some(steps) = &info.steps {
        for (i, s) in steps.iter().enumerate() {
            println!("{}: {:>8.3}  {}", i + 1, s.offset, s.action);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct MacroEntry {
    dir: PathBuf,
    modified: Option<DateTime<Local>>,
    actions: Option<usize>,
}

fn cmd_list(ctx: &Ctx, root: &Path) -> Result<()> {
    let entries: Vec<MacroEntry> = MacroStore::discover(root)?
        .into_iter()
        .map(|store| MacroEntry {
            modified: std::fs::metadata(store.macro_path())
                .and_then(|m| m.modified())
                .ok()
                .map(DateTime::<Local>::from),
            actions: EventLog::load(&store).ok().map(|log| log.len()),
            dir: store.dir().to_path_buf(),
        })
        .collect();

    if ctx.json {
        print_json(&Output::ok(entries));
        return Ok(());
    }

    if entries.is_empty() {
        println!("No macros under {}", root.display());
        return Ok(());
    }
    for e in entries {
        let modified = e
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let actions = e.actions.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string());
        println!("{}  {:>6}  {}", modified, actions, e.dir.display());
    }
    Ok(())
}

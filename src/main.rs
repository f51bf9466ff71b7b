// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use crossterm::event::{Event, KeyEventKind};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use bandchart::chart::{ChartSink, ChartStore};
use bandchart::config::{AppConfig, DEFAULT_CONFIG_FILE};
use bandchart::export::PrintSheet;
use bandchart::metronome::{ClickOutput, MetronomeRunner};
use bandchart::storage::{FileStore, LoadOutcome, StoredChart};
use bandchart::ui::{App, Editor, KeyAction};

/// Log file name inside the storage directory
const LOG_FILE: &str = "bandchart.log";

/// Default length of the headless click test
const DEFAULT_METRONOME_SECONDS: u64 = 10;

fn print_usage() {
    println!("bandchart - Song chart editor with metronome");
    println!();
    println!("Usage: bandchart [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>           Config file (default {})", DEFAULT_CONFIG_FILE);
    println!("  --print [PATH]            Write the saved chart as a print sheet (- for stdout)");
    println!("  --metronome <BPM> [SECS]  Play the metronome on the default audio device");
    println!("  --help                    Show this help message");
    println!();
    println!("Without options the chart editor starts.");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Edit,
    Print(Option<PathBuf>),
    Metronome { bpm: u32, seconds: u64 },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Options {
    config: PathBuf,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Options> {
    let mut config = PathBuf::from(DEFAULT_CONFIG_FILE);
    let mut command = Command::Edit;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--config requires a path"))?;
                config = PathBuf::from(path);
                i += 2;
            }
            "--print" => {
                let path = args
                    .get(i + 1)
                    .filter(|a| !a.starts_with("--"))
                    .map(PathBuf::from);
                i += if path.is_some() { 2 } else { 1 };
                command = Command::Print(path);
            }
            "--metronome" => {
                let bpm = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("--metronome requires a tempo in BPM"))?;
                let bpm: u32 = bpm.parse().map_err(|_| anyhow!("Invalid tempo: {}", bpm))?;
                let seconds = args.get(i + 2).and_then(|s| s.parse::<u64>().ok());
                i += if seconds.is_some() { 3 } else { 2 };
                command = Command::Metronome {
                    bpm,
                    seconds: seconds.unwrap_or(DEFAULT_METRONOME_SECONDS),
                };
            }
            "--help" | "-h" => {
                command = Command::Help;
                i += 1;
            }
            other => bail!("Unknown option: {}", other),
        }
    }

    Ok(Options { config, command })
}

/// Install the tracing subscriber, writing to `log_file` when given
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn open_store(config: &AppConfig) -> (ChartStore<StoredChart<FileStore>>, LoadOutcome) {
    ChartStore::open(FileStore::new(&config.storage.dir))
}

fn print_chart(config: &AppConfig, path: Option<PathBuf>) -> Result<()> {
    let (store, _) = open_store(config);
    let sheet = PrintSheet::new();

    let path = path.unwrap_or_else(|| config.export.path.clone());
    if path.as_os_str() == "-" {
        print!("{}", sheet.render(store.chart()));
        return Ok(());
    }

    sheet
        .export_to(store.chart(), &path)
        .with_context(|| format!("Failed to write print sheet: {:?}", path))?;
    println!("Print sheet written to {}", path.display());
    Ok(())
}

fn run_metronome(config: &AppConfig, bpm: u32, seconds: u64) -> Result<()> {
    let output = ClickOutput::open(config.metronome.output_config())
        .context("Failed to open audio output")?;

    let mut runner = MetronomeRunner::with_config(bpm, config.metronome.scheduler_config());
    println!("Metronome at {} BPM for {} seconds (Ctrl+C to stop)...", bpm, seconds);
    runner.start(output.clock(), output.queue());
    thread::sleep(Duration::from_secs(seconds));
    runner.stop();

    println!("Metronome test complete!");
    Ok(())
}

fn toggle_metronome<S: ChartSink>(
    runner: &mut MetronomeRunner,
    output: Option<&ClickOutput>,
    editor: &mut Editor<S>,
) {
    if runner.is_running() {
        runner.stop();
        return;
    }
    match output {
        Some(output) => runner.start(output.clock(), output.queue()),
        None => editor.state_mut().set_status("No audio device; metronome unavailable"),
    }
}

fn export_sheet<S: ChartSink>(config: &AppConfig, editor: &mut Editor<S>) {
    let path = &config.export.path;
    match PrintSheet::new().export_to(editor.chart(), path) {
        Ok(()) => editor
            .state_mut()
            .set_status(format!("Print sheet written to {}", path.display())),
        Err(e) => {
            error!("Print export failed: {}", e);
            editor.state_mut().set_status(format!("Export failed: {}", e));
        }
    }
}

fn run_editor(config: &AppConfig) -> Result<()> {
    let (store, outcome) = open_store(config);
    let mut editor = Editor::new(store);
    match outcome {
        LoadOutcome::Corrupt(msg) | LoadOutcome::Unreadable(msg) => editor
            .state_mut()
            .set_status(format!("Saved chart could not be loaded, started fresh: {}", msg)),
        LoadOutcome::Restored | LoadOutcome::Missing => {}
    }

    let output = match ClickOutput::open(config.metronome.output_config()) {
        Ok(output) => Some(output),
        Err(e) => {
            warn!("Metronome audio unavailable: {}", e);
            None
        }
    };
    editor.state_mut().metronome.audio = output.is_some();

    let mut runner =
        MetronomeRunner::with_config(editor.chart().tempo, config.metronome.scheduler_config());

    let mut app = App::new(config.ui.frame_rate).context("Failed to initialize terminal")?;
    info!(dir = %config.storage.dir.display(), "Editor started");

    loop {
        editor.state_mut().clear_expired_status();
        app.draw(&editor).context("Failed to draw editor")?;

        if let Some(Event::Key(key)) = app.poll_event()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match editor.handle_key(key.code, key.modifiers) {
                KeyAction::Quit => break,
                KeyAction::ToggleMetronome => {
                    toggle_metronome(&mut runner, output.as_ref(), &mut editor)
                }
                KeyAction::ToggleMute => {
                    let muted = !runner.is_muted();
                    runner.set_muted(muted);
                }
                KeyAction::Export => export_sheet(config, &mut editor),
                KeyAction::None => {}
            }
        }

        // The click follows the chart tempo
        let tempo = editor.chart().tempo;
        if runner.tempo() != tempo {
            runner.set_tempo(tempo);
        }
        let metronome = &mut editor.state_mut().metronome;
        metronome.running = runner.is_running();
        metronome.muted = runner.is_muted();
    }

    runner.stop();
    info!(revision = editor.store().revision(), "Editor closed");
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            std::process::exit(1);
        }
    };

    if options.command == Command::Help {
        print_usage();
        return Ok(());
    }

    let config = AppConfig::load(&options.config)?;

    match options.command {
        Command::Edit => {
            init_logging(Some(&config.storage.dir.join(LOG_FILE)))?;
            run_editor(&config)
        }
        Command::Print(path) => {
            init_logging(None)?;
            print_chart(&config, path)
        }
        Command::Metronome { bpm, seconds } => {
            init_logging(None)?;
            run_metronome(&config, bpm, seconds)
        }
        Command::Help => Ok(()),
    }
}

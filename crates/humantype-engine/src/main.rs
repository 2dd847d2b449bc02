//! humantype command-line entry point.
//!
//! Types a text the way a person would: uneven rhythm, pauses at word and
//! sentence boundaries, and the occasional typo that is noticed and fixed.
//!
//! # Usage
//!
//! ```text
//! humantype [OPTIONS] (--text <TEXT> | --file <PATH>)
//!
//! Options:
//!   --preset <NAME|PATH>  Built-in or saved preset, or a .json/.toml file [default: default]
//!   --seed <N>            Fixed seed for a reproducible run
//!   --countdown <SECS>    Override the preset's countdown
//!   --precise             Type shifted characters as shift + base key
//!   --dry-run             Plan and report, but type nothing and never wait
//!   --plan                Print the per-character plan table and exit
//!   --watch-focus         Abort when the active window title changes (needs xdotool)
//!   --list-presets        Print the available presets and exit
//! ```
//!
//! # Output streams
//!
//! Typed text goes to stdout; countdown, progress summaries and `tracing`
//! diagnostics go to stderr, so `humantype --text hi > out.txt` captures only
//! what was typed.  Ctrl-C stops the run at the next character boundary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use humantype_core::{preprocess, KeyboardLayout};
use humantype_engine::infrastructure::focus::window_title::{CommandTitleSource, WindowTitleMonitor};
use humantype_engine::infrastructure::focus::AlwaysFocused;
use humantype_engine::infrastructure::injection::stdout::StdoutInjector;
use humantype_engine::infrastructure::storage::preset::{
    load_preset, Preset, PresetStore, BUILTIN_PRESETS,
};
use humantype_engine::{
    build_planners, channel_dispatch, AbortReason, Engine, EngineConfig, EngineEvent, FocusProbe,
    RunStats,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Human-like typing simulator.
#[derive(Debug, Parser)]
#[command(
    name = "humantype",
    about = "Types text with human-like timing, typos and corrections",
    version
)]
struct Cli {
    /// Text to type.
    #[arg(long, conflicts_with = "file", required_unless_present_any = ["file", "list_presets"])]
    text: Option<String>,

    /// Read the text to type from this file.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Preset name (built-in or saved) or path to a .json / .toml preset file.
    #[arg(long, default_value = "default", env = "HUMANTYPE_PRESET")]
    preset: String,

    /// Seed for a reproducible run.  Without it every run differs.
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds to wait before typing; overrides the preset.
    #[arg(long)]
    countdown: Option<u32>,

    /// Inject shifted characters as an explicit shift press plus base key.
    #[arg(long)]
    precise: bool,

    /// Run the whole plan without typing or waiting.
    #[arg(long)]
    dry_run: bool,

    /// Print the per-character timing and typo plan, then exit.
    #[arg(long)]
    plan: bool,

    /// Abort when the active window title changes (X11, via xdotool).
    #[arg(long)]
    watch_focus: bool,

    /// List built-in and saved presets, then exit.
    #[arg(long)]
    list_presets: bool,
}

impl Cli {
    /// Applies the command-line overrides to the preset's engine config.
    fn engine_config(&self, preset: &Preset) -> anyhow::Result<EngineConfig> {
        let mut config = preset
            .engine_config()
            .with_context(|| format!("preset {:?} is invalid", preset.preset_name))?;
        if let Some(seconds) = self.countdown {
            config.countdown_seconds = i32::try_from(seconds).context("--countdown is too large")?;
        }
        config.precise_mode |= self.precise;
        config.dry_run = self.dry_run;
        config.seed = self.seed;
        config.focus_monitor_enabled &= self.watch_focus;
        Ok(config)
    }

    fn read_text(&self) -> anyhow::Result<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            (None, None) => anyhow::bail!("either --text or --file is required"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Typed text owns stdout, so diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_presets {
        return list_presets();
    }

    let preset = resolve_preset(&cli.preset)?;
    let config = cli.engine_config(&preset)?;
    let text = preprocess(&cli.read_text()?, &preset.preprocessing);
    info!(
        "preset {:?}, {} characters to type",
        preset.preset_name,
        text.chars().count()
    );

    if cli.plan {
        print!("{}", render_plan(&config, &text)?);
        return Ok(());
    }

    run(config, cli.watch_focus, &text).await
}

// ── Live run ──────────────────────────────────────────────────────────────────

async fn run(config: EngineConfig, watch_focus: bool, text: &str) -> anyhow::Result<()> {
    let dry_run = config.dry_run;
    let (dispatch, mut events) = channel_dispatch();
    let probe: Arc<dyn FocusProbe> = if watch_focus {
        Arc::new(WindowTitleMonitor::new(CommandTitleSource::xdotool()))
    } else {
        Arc::new(AlwaysFocused)
    };
    let engine = Engine::new(config, Arc::new(StdoutInjector::stdout()), dispatch)
        .context("failed to build the typing engine")?
        .with_focus_probe(probe);

    let handle = engine.start(text).context("failed to start typing")?;

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let control = engine.control();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; stopping");
            control.request_stop();
        }
    });

    while let Some(event) = events.recv().await {
        let terminal = event.is_terminal();
        match event {
            EngineEvent::Countdown { seconds_remaining } => {
                eprintln!("starting in {seconds_remaining}...");
            }
            EngineEvent::Log(line) if dry_run => eprintln!("{line}"),
            EngineEvent::Completed(stats) => {
                println!();
                eprint!("{}", summary(&stats));
            }
            EngineEvent::Aborted(AbortReason::Stopped) => {
                println!();
                eprintln!("stopped");
            }
            EngineEvent::Aborted(AbortReason::FocusLost { char_index }) => {
                println!();
                eprintln!("target window lost focus before character {char_index}; aborted");
            }
            _ => {}
        }
        if terminal {
            break;
        }
    }

    handle.await.context("typing task failed")?;
    Ok(())
}

fn summary(stats: &RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "typed {} characters in {:.1}s ({:.0} cpm, {:.0} wpm)",
        stats.characters_typed,
        stats.elapsed.as_secs_f64(),
        stats.cpm,
        stats.wpm
    );
    let _ = writeln!(
        out,
        "typos: {} ({} corrected, {} left in)",
        stats.typo_count, stats.typos.corrected, stats.typos.uncorrected
    );
    let _ = writeln!(
        out,
        "delay: avg {:.0} ms, min {:.0} ms, max {:.0} ms",
        stats.avg_delay_ms, stats.min_delay_ms, stats.max_delay_ms
    );
    if stats.injection_failures > 0 {
        let _ = writeln!(out, "injection failures: {}", stats.injection_failures);
    }
    out
}

// ── Presets ───────────────────────────────────────────────────────────────────

/// A path with a preset extension is loaded directly; anything else is a
/// preset name looked up in the user store and then the built-ins.
fn resolve_preset(name: &str) -> anyhow::Result<Preset> {
    let path = Path::new(name);
    if path.extension().is_some() && path.is_file() {
        return load_preset(path)
            .with_context(|| format!("failed to load preset file {}", path.display()));
    }
    match PresetStore::open_default() {
        Ok(store) => store
            .load(name)
            .with_context(|| format!("failed to load preset {name:?}")),
        Err(_) => Preset::builtin(name).with_context(|| format!("unknown preset {name:?}")),
    }
}

fn list_presets() -> anyhow::Result<()> {
    for preset in Preset::builtins() {
        println!("{:<18} {}", preset.preset_name, preset.preset_description);
    }
    if let Ok(store) = PresetStore::open_default() {
        for name in store.list().context("failed to list saved presets")? {
            if BUILTIN_PRESETS.contains(&name.as_str()) {
                continue;
            }
            let description = store
                .load(&name)
                .map(|p| p.preset_description)
                .unwrap_or_else(|e| format!("(unreadable: {e})"));
            println!("{name:<18} {description}");
        }
    }
    Ok(())
}

// ── Plan table ────────────────────────────────────────────────────────────────

/// Renders what a run with `config` would do, one row per planned character.
///
/// With `--seed`, the table matches the run with the same seed exactly.
fn render_plan(config: &EngineConfig, text: &str) -> anyhow::Result<String> {
    let layout = Arc::new(KeyboardLayout::us_qwerty());
    let (mut timing, mut typo) =
        build_planners(config, &layout).context("invalid timing or typo settings")?;
    let timings = timing.calculate_all(text);
    let planned = typo.process_text(text);

    let mut out = String::new();
    let _ = writeln!(out, "{:>5}  {:<6} {:>8}  {:<48} breakdown", "index", "char", "delay", "actions");
    for p in &planned {
        let Some(t) = timings.get(p.index) else {
            continue;
        };
        let actions = p
            .plan
            .actions
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "{:>5}  {:<6} {:>6.0}ms  {:<48} {}",
            p.index,
            format!("{:?}", p.ch),
            t.delay_ms,
            actions,
            t.breakdown
        );
    }

    let total_ms: f64 = timings.iter().map(|t| t.delay_ms).sum();
    let stats = typo.stats();
    let _ = writeln!(
        out,
        "\n{} characters on the {} layout, {:.1}s of delays, {} typos ({} corrected)",
        timings.len(),
        layout.name(),
        total_ms / 1000.0,
        stats.total(),
        stats.corrected
    );
    Ok(out)
}

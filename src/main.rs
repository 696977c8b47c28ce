//! CLI entry point for camview
//!
//! Provides command-line interface for listing shortcuts, rendering a single
//! raw frame to PNG, and running a headless live loop over a watched frame
//! file.

use anyhow::Context;
use camview::config::{load_config, ViewerConfig};
use camview::core::{keys, parse_shortcut, ShortcutKey};
use camview::pipeline::{
    channel_source, source::read_raw_frame, FileFrameSource, FramePipeline, SampleFormat,
    ScaleMode, TickOutcome,
};
use camview::viewer::{save_png, SnapshotPlugin, Viewer};
use clap::{Parser, Subcommand};
use colored::*;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;

#[derive(Parser)]
#[command(name = "camview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all bound shortcuts
    Keys {
        /// Path to viewer config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Render one raw frame to PNG
    Render {
        /// Raw frame file (little-endian, row major)
        #[arg(short, long)]
        frame: PathBuf,
        #[arg(long)]
        rows: usize,
        #[arg(long)]
        cols: usize,
        /// Sample encoding: f32 or u16
        #[arg(long, default_value = "f32")]
        format: SampleFormat,
        /// Zoom level (0 = full frame)
        #[arg(short, long)]
        zoom: Option<u32>,
        /// Scaling: linear, root or log
        #[arg(short, long)]
        mode: Option<ScaleMode>,
        /// Colormap index into the configured list
        #[arg(long)]
        cmap: Option<usize>,
        /// Low clip bound
        #[arg(long, allow_hyphen_values = true)]
        low: Option<f32>,
        /// High clip bound
        #[arg(long, allow_hyphen_values = true)]
        high: Option<f32>,
        /// Path to viewer config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Live loop: re-render whenever the frame file changes or a shortcut
    /// read from stdin is applied (EOF quits)
    Watch {
        /// Raw frame file to watch
        #[arg(short, long)]
        frame: PathBuf,
        #[arg(long)]
        rows: usize,
        #[arg(long)]
        cols: usize,
        /// Sample encoding: f32 or u16
        #[arg(long, default_value = "f32")]
        format: SampleFormat,
        /// Path to viewer config (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output PNG, rewritten after every rendered frame
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keys { config } => list_shortcuts(config.as_deref())?,
        Commands::Render {
            frame,
            rows,
            cols,
            format,
            zoom,
            mode,
            cmap,
            low,
            high,
            config,
            output,
        } => {
            let mut settings = settings(config.as_deref())?;
            if let Some(mode) = mode {
                settings.scale_mode = mode;
            }
            if let Some(cmap) = cmap {
                settings.initial_colormap = cmap;
            }
            if low.is_some() || high.is_some() {
                settings.clip_low = low;
                settings.clip_high = high;
            }

            render_frame(&settings, &frame, (rows, cols), format, zoom, &output)?
        }
        Commands::Watch {
            frame,
            rows,
            cols,
            format,
            config,
            output,
        } => watch(&settings(config.as_deref())?, frame, (rows, cols), format, &output)?,
    }

    Ok(())
}

/// Config from `path`, or defaults when none is given
fn settings(path: Option<&Path>) -> anyhow::Result<ViewerConfig> {
    match path {
        Some(path) => load_config(path).with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(ViewerConfig::default()),
    }
}

/// Builds a viewer with the built-in shortcuts and the snapshot plugin
fn build_viewer(pipeline: FramePipeline, settings: &ViewerConfig) -> anyhow::Result<Viewer> {
    let mut viewer = Viewer::new(pipeline)?;
    viewer.register_plugin(Box::new(SnapshotPlugin::new(settings.snapshot_dir())))?;
    Ok(viewer)
}

/// List every bound shortcut, grouped by owner
fn list_shortcuts(config: Option<&Path>) -> anyhow::Result<()> {
    let settings = settings(config)?;
    settings.validate()?;

    // Shape is irrelevant: nothing is rendered
    let (_tx, source) = channel_source((1, 1));
    let pipeline = FramePipeline::builder(Box::new(source))
        .palettes(settings.palettes()?)
        .colormap(settings.initial_colormap)
        .build()?;
    let viewer = build_viewer(pipeline, &settings)?;

    let bindings = viewer.bindings();
    let mut current_owner = "";

    for binding in &bindings {
        if binding.owner != current_owner {
            current_owner = binding.owner.as_str();
            println!("\n{}", current_owner.bold());
        }
        println!(
            "  {} {}",
            format!("{:<12}", binding.key.to_string()).cyan(),
            binding.description
        );
    }

    println!(
        "\n{} {} shortcuts bound, {} always quits",
        "✓".green(),
        bindings.len(),
        "Escape / x".yellow()
    );

    Ok(())
}

/// One pipeline pass over a raw frame file, written as PNG
fn render_frame(
    settings: &ViewerConfig,
    frame_path: &Path,
    shape: (usize, usize),
    format: SampleFormat,
    zoom: Option<u32>,
    output: &Path,
) -> anyhow::Result<()> {
    let frame = read_raw_frame(frame_path, shape, format)
        .with_context(|| format!("Failed to read {}", frame_path.display()))?;

    println!("{} Rendering {} ({}x{})", "→".cyan(), frame_path.display(), shape.0, shape.1);

    let (tx, source) = channel_source(shape);
    tx.send(frame).context("Frame channel closed")?;

    let mut pipeline = settings.pipeline_builder(Box::new(source))?.build()?;
    if let Some(level) = zoom {
        pipeline.set_zoom(Some(level))?;
    }

    let outcome = pipeline.advance()?;
    let rgb = pipeline
        .rgb()
        .ok_or_else(|| anyhow::anyhow!("No output rendered"))?;
    save_png(rgb, output)?;

    let stats = pipeline.stats();
    if outcome == TickOutcome::Degenerate {
        println!("{} Flat frame, rendered uniform mid-scale", "⚠".yellow());
    }
    println!(
        "  raw min {:.3} max {:.3} mean {:.3} | display [{:.3}, {:.3}] {} {}",
        stats.raw.min,
        stats.raw.max,
        stats.raw.mean,
        stats.low,
        stats.high,
        pipeline.scale_mode().to_string().magenta(),
        pipeline.colormap_name().green()
    );
    println!("{} Wrote {}", "✓".green(), output.display());

    Ok(())
}

/// Descriptor, arrow name or raw `0x` key code typed on stdin
fn parse_key_line(line: &str) -> anyhow::Result<ShortcutKey> {
    let key = match line.to_lowercase().as_str() {
        "up" => ShortcutKey::bare(keys::UP),
        "down" => ShortcutKey::bare(keys::DOWN),
        "left" => ShortcutKey::bare(keys::LEFT),
        "right" => ShortcutKey::bare(keys::RIGHT),
        "esc" | "escape" => ShortcutKey::bare(keys::ESCAPE),
        other => match other.strip_prefix("0x") {
            Some(hex) => ShortcutKey::bare(u32::from_str_radix(hex, 16)?),
            None => parse_shortcut(line)?,
        },
    };
    Ok(key)
}

/// Headless live loop over a watched frame file
fn watch(
    settings: &ViewerConfig,
    frame_path: PathBuf,
    shape: (usize, usize),
    format: SampleFormat,
    output: &Path,
) -> anyhow::Result<()> {
    let source = FileFrameSource::new(frame_path.clone(), shape, format)
        .with_context(|| format!("Failed to watch {}", frame_path.display()))?;
    let pipeline = settings.pipeline_builder(Box::new(source))?.build()?;
    let mut viewer = build_viewer(pipeline, settings)?;

    // Stdin is read on its own thread; the display loop only polls
    let (tx, rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    println!(
        "{} Watching {} → {} (type shortcuts, EOF or x to quit)",
        "→".cyan(),
        frame_path.display(),
        output.display()
    );

    'display: loop {
        let mut dirty = false;
        loop {
            let line = match rx.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'display,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_key_line(line) {
                Ok(key) if key.is_reserved() => break 'display,
                Ok(key) => {
                    if viewer.handle_key_event(key.modifier_mask(), key.key_code()) {
                        dirty = true;
                    } else {
                        println!("{} {} is not bound", "⚠".yellow(), key);
                    }
                }
                Err(e) => println!("{} {}", "✗".red(), e),
            }
        }

        // A static frame file never delivers again, so shortcuts are shown
        // by re-rendering the held frame
        let outcome = match viewer.tick()? {
            TickOutcome::Skipped if dirty => viewer.redraw(),
            outcome => outcome,
        };
        if outcome == TickOutcome::Skipped {
            continue;
        }

        let handle = viewer.handle();
        let pipeline = handle.pipeline();
        if let Some(rgb) = pipeline.rgb() {
            save_png(rgb, output)?;
        }
        tracing::info!(
            ?outcome,
            frame = pipeline.frames_rendered(),
            zoom = pipeline.crop().zoom_level(),
            mode = %pipeline.scale_mode(),
            colormap = pipeline.colormap_name(),
            "frame rendered"
        );
    }

    println!("{} Stopped", "✓".green());
    Ok(())
}

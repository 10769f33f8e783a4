use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use pixmark::config::PixmarkConfig;
use pixmark::core::{CaptureSession, LocalBridge};
use pixmark::domain::Point;
use pixmark::session::layout;
use pixmark::session::messages::{Effect, Key, Modifiers, ToolbarAction};

/// Toolbar width used to report its placement
const TOOLBAR_WIDTH: f32 = 280.0;

#[derive(Parser, Debug)]
#[command(
    name = "pixmark",
    version,
    about = "Replay a screenshot selection and annotation session"
)]
struct Args {
    /// Screenshot to select from
    #[arg(long, value_name = "FILE")]
    image: PathBuf,

    /// JSON array of `{name, bounds}` window candidates
    #[arg(long, value_name = "FILE")]
    windows: Option<PathBuf>,

    /// JSON array of pointer, key and toolbar steps
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Device pixels per logical pixel of the screenshot
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Host pixels per logical pixel of the window bounds
    #[arg(long, default_value_t = 1.0)]
    window_scale: f32,

    /// Save into this folder instead of the configured one
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

/// One recorded input, positions in logical container pixels
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Step {
    Down {
        x: f32,
        y: f32,
    },
    Move {
        x: f32,
        y: f32,
    },
    Up {
        x: f32,
        y: f32,
    },
    Leave {
        x: f32,
        y: f32,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Toolbar(ToolbarAction),
}

fn load_script(path: &Path) -> anyhow::Result<Vec<Step>> {
    let json =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
}

async fn run_step(
    session: &mut CaptureSession<LocalBridge>,
    step: Step,
) -> anyhow::Result<Vec<Effect>> {
    match step {
        Step::Down { x, y } => session.pointer_down(Point::new(x, y)),
        Step::Move { x, y } => session.pointer_move(Point::new(x, y)),
        Step::Up { x, y } => session.pointer_up(Point::new(x, y)),
        Step::Leave { x, y } => session.pointer_leave(Point::new(x, y)),
        Step::Key { key, modifiers } => session.key(key, modifiers).await,
        Step::Toolbar(action) => session.toolbar(action).await,
    }
}

async fn replay(bridge: LocalBridge, config: PixmarkConfig, steps: Vec<Step>) -> anyhow::Result<()> {
    let mut session = CaptureSession::new(bridge, config);
    session.start().await?;

    for (index, step) in steps.into_iter().enumerate() {
        if session.is_exited() {
            log::info!("Session ended, skipping remaining steps");
            break;
        }
        log::debug!("Step {}: {:?}", index, step);
        match run_step(&mut session, step).await {
            Ok(effects) => {
                for effect in effects {
                    log::info!("Step {} effect: {:?}", index, effect);
                }
            }
            Err(err) => log::warn!("Step {} failed: {:#}", index, err),
        }
    }

    let selection = session.selection();
    println!("mode: {:?}", session.mode());
    println!(
        "selection: {} {} {} {}",
        selection.x, selection.y, selection.width, selection.height
    );
    if let Some(label) = session.size_label() {
        let label_at = layout::size_label_anchor(selection);
        let toolbar_at = session.toolbar_anchor(TOOLBAR_WIDTH);
        println!("size: {} at {} {}", label, label_at.x, label_at.y);
        println!("toolbar: {} {}", toolbar_at.x, toolbar_at.y);
    }
    println!("shapes: {}", session.canvas().shapes().len());
    println!("exited: {}", session.bridge().has_exited());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = PixmarkConfig::load();
    // first run: write the defaults so they can be edited
    if PixmarkConfig::path().is_some_and(|path| !path.exists()) {
        config.save();
    }
    let steps = match &args.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    let mut bridge =
        LocalBridge::new(&args.image, args.scale).with_save_location(config.save_location);
    if let Some(path) = &args.windows {
        bridge = bridge.with_windows(path, args.window_scale);
    }
    if let Some(dir) = &args.output_dir {
        bridge = bridge.with_save_dir(dir);
    }

    replay(bridge, config, steps).await
}

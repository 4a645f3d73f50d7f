use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use meadow_common::Vector3;
use meadow_input::{Action, Direction, HeldKeys};
use meadow_kernel::{Bounds, Generate, GeneratorConfig, SeededSource, SessionState, WorldGenerator};
use meadow_persist::{
    BlobStore, FileBlobStore, MemoryBlobStore, SessionConfig, SessionStore, load_session,
};
use meadow_render::{DebugTextRenderer, FollowCamera, Renderer, Scene};
use meadow_tools::SessionInspector;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meadow-cli", about = "CLI tool for meadow sessions")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session data directory
    #[arg(long, global = true, default_value = "./meadow_data")]
    data_dir: PathBuf,

    /// Session config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and session settings
    Info,
    /// Generate a world and print it, without touching storage
    Generate {
        /// Number of plants
        #[arg(short, long, default_value = "30", allow_negative_numbers = true)]
        count: i64,
        /// RNG seed; random when omitted
        #[arg(short, long)]
        seed: Option<u64>,
        /// Lower bound for x and z
        #[arg(long, default_value = "-90", allow_negative_numbers = true)]
        min: f64,
        /// Upper bound for x and z
        #[arg(long, default_value = "90", allow_negative_numbers = true)]
        max: f64,
        /// Print the composed scene primitives instead of the plant list
        #[arg(long)]
        scene: bool,
    },
    /// Summarize the saved session
    Show {
        /// List every plant
        #[arg(long)]
        plants: bool,
    },
    /// Delete the saved session so the next start generates a fresh world
    Reset,
    /// Run headless frames with held keys and a simulated clock
    Simulate {
        /// Number of frames
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Held directions as W/A/S/D characters, e.g. "wd"
        #[arg(short, long, default_value = "")]
        keys: String,
        /// Clock value of the first frame, in milliseconds
        #[arg(long, default_value = "0")]
        start_ms: u64,
        /// Milliseconds between frames
        #[arg(long, default_value = "16")]
        frame_ms: u64,
        /// Seed for a fresh world
        #[arg(long)]
        seed: Option<u64>,
        /// Use in-memory storage instead of the data directory
        #[arg(long)]
        memory: bool,
    },
}

fn generator(seed: Option<u64>) -> WorldGenerator<SeededSource> {
    let source = seed.map_or_else(SeededSource::from_entropy, SeededSource::seeded);
    WorldGenerator::new(source)
}

fn parse_keys(keys: &str) -> Result<HeldKeys> {
    let mut held = HeldKeys::new();
    for c in keys.chars() {
        match Direction::from_char(c) {
            Some(direction) => held.press(direction),
            None => bail!("unknown direction key {c:?}, expected one of w/a/s/d"),
        }
    }
    Ok(held)
}

/// Outcome of a headless run.
#[derive(Debug, PartialEq)]
struct SimulationReport {
    frames: u64,
    /// Clock values of the ticks that wrote the session.
    saved_at: Vec<u64>,
    failed_writes: usize,
    final_position: Vector3,
}

fn simulate<S: BlobStore>(
    store: &mut SessionStore<S>,
    keys: &HeldKeys,
    frames: u64,
    start_ms: u64,
    frame_ms: u64,
) -> SimulationReport {
    let mut saved_at = Vec::new();
    let mut failed_writes = 0;
    for frame in 0..frames {
        let now = start_ms.saturating_add(frame.saturating_mul(frame_ms));
        if let Some(Action::Move(delta)) = Action::from_held(keys) {
            store.record_player_movement(delta);
        }
        match store.tick(now) {
            Ok(true) => saved_at.push(now),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(now, "save failed: {e}");
                failed_writes += 1;
            }
        }
    }
    SimulationReport {
        frames,
        saved_at,
        failed_writes,
        final_position: store.state().player_position(),
    }
}

fn print_report(report: &SimulationReport, state: &SessionState) {
    println!("Frames: {}", report.frames);
    println!("Writes: {} at {:?}", report.saved_at.len(), report.saved_at);
    if report.failed_writes > 0 {
        println!("Failed writes: {}", report.failed_writes);
    }
    println!("{}", SessionInspector::summary(state));
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = SessionConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("meadow-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("data dir: {}", cli.data_dir.display());
            println!("storage key: {}", config.storage_key);
            println!("save policy: {:?}", config.save_policy);
            let bounds = config.generator.bounds();
            println!(
                "generator: {} plants in [{}, {}]",
                config.generator.count(),
                bounds.min,
                bounds.max
            );
            let storage = FileBlobStore::open(&cli.data_dir)?;
            let saved = storage.load_blob(&config.storage_key)?.is_some();
            println!("saved session: {}", if saved { "yes" } else { "no" });
        }
        Commands::Generate {
            count,
            seed,
            min,
            max,
            scene,
        } => {
            let gen_config = GeneratorConfig::new(count, Bounds { min, max })?;
            let plants = generator(seed).generate(&gen_config);
            let state = SessionState::fresh(plants);
            if scene {
                let mut camera = FollowCamera::default();
                camera.follow(state.player_position().into());
                let text = DebugTextRenderer::new()
                    .render(&Scene::compose(&state, false), &camera.render_view());
                print!("{text}");
            } else {
                println!("{}", SessionInspector::summary(&state));
                for info in SessionInspector::list_plants(&state) {
                    println!("  {info}");
                }
            }
        }
        Commands::Show { plants } => {
            let storage = FileBlobStore::open(&cli.data_dir)?;
            match load_session(&storage, &config.storage_key)? {
                Some(state) => {
                    println!("{}", SessionInspector::summary(&state));
                    if let Some(nearest) = SessionInspector::nearest_plant(&state) {
                        println!("Nearest plant: {nearest}");
                    }
                    if plants {
                        for info in SessionInspector::list_plants(&state) {
                            println!("  {info}");
                        }
                    }
                }
                None => println!("No saved session in {}", cli.data_dir.display()),
            }
        }
        Commands::Reset => {
            let mut storage = FileBlobStore::open(&cli.data_dir)?;
            if storage.remove_blob(&config.storage_key)? {
                println!("Removed saved session from {}", cli.data_dir.display());
            } else {
                println!("No saved session in {}", cli.data_dir.display());
            }
        }
        Commands::Simulate {
            frames,
            keys,
            start_ms,
            frame_ms,
            seed,
            memory,
        } => {
            let held = parse_keys(&keys)?;
            let mut generator = generator(seed);
            if memory {
                let mut store =
                    SessionStore::startup(MemoryBlobStore::new(), &config, &mut generator)?;
                let report = simulate(&mut store, &held, frames, start_ms, frame_ms);
                print_report(&report, store.state());
            } else {
                let storage = FileBlobStore::open(&cli.data_dir)
                    .with_context(|| format!("opening data dir {}", cli.data_dir.display()))?;
                let mut store = SessionStore::startup(storage, &config, &mut generator)?;
                println!("Session origin: {:?}", store.origin());
                if let Some(e) = store.unsaved_error() {
                    println!("Initial save failed: {e}");
                }
                let report = simulate(&mut store, &held, frames, start_ms, frame_ms);
                print_report(&report, store.state());
            }
        }
    }

    Ok(())
}

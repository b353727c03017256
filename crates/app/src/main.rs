use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use light_paint_core::{
    sim::PANDA_REACH, ActuatorPublisher, DrawConfig, FrameList, FrameSequencer, LoggingGripper,
    MotionPlanner, PathBuilder, RunReport, ShutterCue, ShutterEvent, SimulatedArm, Sleeper,
    ThreadSleeper, VirtualClock,
};
use tracing_subscriber::EnvFilter;

fn main() -> light_paint_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            frames,
            config,
            reach,
            report,
            dry_run,
        } => run_session(&frames, config.as_deref(), reach, report.as_deref(), dry_run),
        Commands::Plan { frames, config } => run_plan(&frames, config.as_deref()),
        Commands::Shake {
            count,
            config,
            reach,
        } => run_shake(count, config.as_deref(), reach),
        Commands::Defaults { output } => write_defaults(&output),
    }
}

fn run_session(
    frames: &Path,
    config: Option<&Path>,
    reach: f64,
    report_path: Option<&Path>,
    dry_run: bool,
) -> light_paint_core::Result<()> {
    let config = load_config(config)?;
    let frames = FrameList::from_path(frames)?;
    tracing::info!(frames = frames.len(), dry_run, "loaded animation");

    let report = if dry_run {
        let (report, clock) = draw(&config, &frames, reach, VirtualClock::new())?;
        tracing::info!(
            seconds = clock.elapsed().as_secs_f64(),
            waits = clock.waits(),
            "simulated session length"
        );
        report
    } else {
        draw(&config, &frames, reach, ThreadSleeper)?.0
    };

    if let Some(path) = report_path {
        std::fs::write(path, report.to_json_pretty()?)?;
        tracing::info!(?path, "wrote run report");
    }

    if !report.is_clean() {
        tracing::warn!(
            homed = report.homed,
            partial = report.partial(),
            skipped = report.skipped(),
            "session finished with degraded frames"
        );
    }
    Ok(())
}

fn draw<S: Sleeper + Clone>(
    config: &DrawConfig,
    frames: &FrameList,
    reach: f64,
    sleeper: S,
) -> light_paint_core::Result<(RunReport, S)> {
    let mut sequencer =
        FrameSequencer::new(config, SimulatedArm::new(reach), LoggingGripper::new(), sleeper)?
            .with_cue(StdoutCue);
    let report = sequencer.run(frames);
    Ok((report, sequencer.sleeper().clone()))
}

fn run_plan(frames: &Path, config: Option<&Path>) -> light_paint_core::Result<()> {
    let config = load_config(config)?;
    let frames = FrameList::from_path(frames)?;
    let paths = PathBuilder::new(&config).build_all(&frames)?;
    println!("{}", serde_json::to_string_pretty(&paths)?);
    Ok(())
}

fn run_shake(count: i64, config: Option<&Path>, reach: f64) -> light_paint_core::Result<()> {
    let config = load_config(config)?;
    let mut sequencer = FrameSequencer::new(
        &config,
        SimulatedArm::new(reach),
        LoggingGripper::new(),
        ThreadSleeper,
    )?;

    if let Err(err) = sequencer.home() {
        tracing::error!(%err, "homing failed before shake");
    }
    shake_and_report(&mut sequencer, count);
    Ok(())
}

/// Runs the gesture and logs a rejected count or a failed move instead of
/// ending the process with an error.
fn shake_and_report<P, A, S>(sequencer: &mut FrameSequencer<P, A, S>, count: i64) -> Option<usize>
where
    P: MotionPlanner,
    A: ActuatorPublisher,
    S: Sleeper,
{
    match sequencer.shake(count) {
        Ok(moves) => {
            tracing::info!(count, moves, "shake complete");
            Some(moves)
        }
        Err(err) => {
            tracing::error!(%err, count, "shake not performed");
            None
        }
    }
}

fn write_defaults(output: &Path) -> light_paint_core::Result<()> {
    std::fs::write(output, DrawConfig::default().to_json_pretty()?)?;
    tracing::info!(?output, "wrote default configuration");
    Ok(())
}

fn load_config(path: Option<&Path>) -> light_paint_core::Result<DrawConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            DrawConfig::from_path(path)
        }
        None => Ok(DrawConfig::default()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

/// Prints shutter markers for whoever is operating the camera.
struct StdoutCue;

impl ShutterCue for StdoutCue {
    fn announce(&mut self, frame: usize, event: ShutterEvent) {
        println!("[frame {frame}] {}", event.label());
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Robot arm light painting controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Draw every frame of an animation against the simulated rig.
    Run {
        /// JSON file holding the frame list.
        #[arg(short, long)]
        frames: PathBuf,
        /// Optional drawing configuration; defaults are used when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Reach of the simulated arm in metres.
        #[arg(long, default_value_t = PANDA_REACH)]
        reach: f64,
        /// Write the per-frame run report to this path.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Skip real waits and report the simulated session length.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the world poses computed for every frame.
    Plan {
        #[arg(short, long)]
        frames: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Home the arm and perform the acknowledgement shake.
    Shake {
        /// Number of repetitions.
        #[arg(long, allow_negative_numbers = true)]
        count: i64,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = PANDA_REACH)]
        reach: f64,
    },
    /// Write the default configuration as JSON.
    Defaults {
        output: PathBuf,
    },
}

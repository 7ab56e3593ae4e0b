use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use log::{error, info, warn};

use camcal_core::{
    CalibrationError, CalibrationOrchestrator, CaptureOutcome, CaptureSession, CaptureTrigger,
    Frame, PoseDeltaTrigger, SessionConfig, TimeIntervalTrigger, TriggerMethod,
};
use camcal_io::{ColmapSolver, PngFrameStore, TumTrajectory, YamlDescriptorWriter, load_frame};

/// Oldest-first backlog between the frame loader and the session
const FRAME_QUEUE_DEPTH: usize = 10;

const EXIT_CALIBRATION_FAILED: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;

/// Collect calibration images by motion or time and solve camera
/// intrinsics with an external structure-from-motion pipeline.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory of sequential color frames, replayed in sorted order
    #[arg(long)]
    images: PathBuf,

    /// TUM-format trajectory file, required for the pose-delta trigger
    #[arg(long)]
    trajectory: Option<PathBuf>,

    /// Camera name used to label the output descriptor
    #[arg(long, default_value = "camera")]
    camera_name: String,

    /// Calibration method, only "colmap" is supported
    #[arg(long, default_value = "colmap")]
    calibration_method: String,

    /// Trigger method, "pose-delta" or "time-interval"
    #[arg(long, default_value = "pose-delta")]
    trigger_method: String,

    /// Number of frames to collect before solving
    #[arg(long, default_value_t = 50)]
    frames: usize,

    /// Parent reference frame for pose lookups
    #[arg(long, default_value = "world")]
    parent_frame: String,

    /// Child reference frame for pose lookups
    #[arg(long, default_value = "base_link")]
    child_frame: String,

    /// Translation threshold in meters (pose-delta trigger)
    #[arg(long, default_value_t = 5.0)]
    delta_distance: f64,

    /// Rotation threshold in degrees (pose-delta trigger)
    #[arg(long, default_value_t = 3.0)]
    delta_rotation: f64,

    /// Elapsed frame-stamp time in seconds (time-interval trigger)
    #[arg(long, default_value_t = 1.0)]
    delta_time: f64,

    /// Output descriptor path
    #[arg(long, default_value = "camera_calibration.yaml")]
    output: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            if matches!(err, CalibrationError::Config(_)) {
                ExitCode::from(EXIT_CONFIG_ERROR)
            } else {
                ExitCode::from(EXIT_CALIBRATION_FAILED)
            }
        }
    }
}

fn run(args: Args) -> camcal_core::Result<()> {
    let config = SessionConfig {
        camera_name: args.camera_name.clone(),
        calibration_method: args.calibration_method.parse()?,
        trigger_method: args.trigger_method.parse()?,
        target_frame_count: args.frames,
        parent_frame: args.parent_frame.clone(),
        child_frame: args.child_frame.clone(),
        delta_distance: args.delta_distance,
        delta_rotation_deg: args.delta_rotation,
        delta_time: args.delta_time,
    };
    config.validate()?;

    let working_directory = create_working_directory()?;
    info!("collecting frames into {}", working_directory.display());

    let solver = ColmapSolver::new(working_directory.clone());
    if !solver.available() {
        return Err(CalibrationError::Config(
            "colmap is not installed or not on PATH".to_string(),
        ));
    }

    let trigger = build_trigger(&config, args.trajectory.as_deref())?;
    let mut session = CaptureSession::new(working_directory, config.target_frame_count, trigger);
    let sink = PngFrameStore;

    let frame_paths = list_frames(&args.images)?;
    if frame_paths.is_empty() {
        return Err(CalibrationError::Config(format!(
            "no image files found in {}",
            args.images.display()
        )));
    }

    // Loader thread decodes ahead; the bounded channel delivers oldest
    // first and the session consumes strictly one frame at a time.
    let (sender, receiver) = mpsc::sync_channel::<Frame>(FRAME_QUEUE_DEPTH);
    let loader = thread::spawn(move || {
        for (index, path) in frame_paths.into_iter().enumerate() {
            match load_frame(&path, stamp_for(&path, index)) {
                Ok(frame) => {
                    if sender.send(frame).is_err() {
                        break;
                    }
                }
                Err(err) => warn!("skipping undecodable frame: {err}"),
            }
        }
    });

    let mut complete = false;
    while let Ok(frame) = receiver.recv() {
        match session.on_frame(&frame, &sink) {
            Ok(CaptureOutcome::SessionComplete) => {
                complete = true;
                break;
            }
            Ok(_) => {}
            Err(err) => warn!("{err}"),
        }
    }
    // Stop frame delivery before the long solve begins
    drop(receiver);
    if loader.join().is_err() {
        warn!("frame loader thread panicked; continuing with the frames received");
    }

    if !complete {
        return Err(CalibrationError::Capture(format!(
            "image sequence ended after {} of {} captures",
            session.frame_counter(),
            config.target_frame_count + 1
        )));
    }

    let image_size = session.image_size().ok_or_else(|| {
        CalibrationError::Capture("no frame dimensions were recorded".to_string())
    })?;

    let writer = YamlDescriptorWriter::new(&args.output);
    CalibrationOrchestrator::new(solver, writer).finalize(
        &config.camera_name,
        session.captured_paths(),
        image_size,
    )?;
    info!("calibration descriptor written to {}", args.output.display());
    Ok(())
}

fn build_trigger(
    config: &SessionConfig,
    trajectory: Option<&Path>,
) -> camcal_core::Result<CaptureTrigger> {
    match config.trigger_method {
        TriggerMethod::PoseDelta => {
            let path = trajectory.ok_or_else(|| {
                CalibrationError::Config(
                    "--trajectory is required for the pose-delta trigger".to_string(),
                )
            })?;
            let source = TumTrajectory::load(path)?;
            if source.is_empty() {
                return Err(CalibrationError::Config(format!(
                    "{} contains no trajectory samples",
                    path.display()
                )));
            }
            Ok(CaptureTrigger::PoseDelta {
                trigger: PoseDeltaTrigger::new(
                    config.delta_distance,
                    config.delta_rotation_deg.to_radians(),
                ),
                source: Box::new(source),
                child_frame: config.child_frame.clone(),
                parent_frame: config.parent_frame.clone(),
            })
        }
        TriggerMethod::TimeInterval => Ok(CaptureTrigger::TimeInterval(TimeIntervalTrigger::new(
            config.delta_time,
        ))),
    }
}

/// Fresh per-run directory under the system temp dir; it is left on disk
/// afterwards so the operator can inspect the captured set.
fn create_working_directory() -> camcal_core::Result<PathBuf> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let directory = std::env::temp_dir().join(format!("cameracalibrator_{stamp}"));
    std::fs::create_dir_all(&directory)
        .map_err(|err| CalibrationError::Config(format!("{}: {err}", directory.display())))?;
    Ok(directory)
}

/// Image files of `dir` in sorted name order
fn list_frames(dir: &Path) -> camcal_core::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|err| CalibrationError::Config(format!("{}: {err}", dir.display())))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| CalibrationError::Config(format!("{}: {err}", dir.display())))?
            .path();
        if is_image_file(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                matches!(
                    extension.to_ascii_lowercase().as_str(),
                    "png" | "jpg" | "jpeg" | "bmp" | "tif" | "tiff"
                )
            })
}

/// Replay stamp for a frame: numeric file stem when present (the common
/// dataset convention), otherwise the sequence index in seconds.
fn stamp_for(path: &Path, index: usize) -> f64 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse::<f64>().ok())
        .unwrap_or(index as f64)
}

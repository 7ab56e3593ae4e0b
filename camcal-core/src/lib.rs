//! Capture-triggering state machine and session orchestration for
//! automatic camera calibration.
//!
//! Frames flow through a [`CaptureSession`], which asks the configured
//! [`CaptureTrigger`] whether each moment is novel enough (by pose
//! displacement or elapsed time) to persist. Once the target count is
//! reached, the [`CalibrationOrchestrator`] runs the external solver and
//! writes the calibration descriptor.

pub mod calibrate;
pub mod config;
pub mod error;
pub mod pose;
pub mod session;
pub mod trigger;

pub use calibrate::{
    CalibrationOrchestrator, CameraDescriptor, DescriptorWriter, SfmResult, SfmSolver,
};
pub use config::{CalibrationMethod, SessionConfig, TriggerMethod};
pub use error::{CalibrationError, Result};
pub use pose::{Pose, PoseSource};
pub use session::{CaptureOutcome, CaptureSession, Frame, FrameSink};
pub use trigger::{CaptureTrigger, PoseDeltaTrigger, TimeIntervalTrigger};

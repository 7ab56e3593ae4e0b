use std::str::FromStr;

use crate::error::{CalibrationError, Result};

/// How the next capture moment is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMethod {
    PoseDelta,
    TimeInterval,
}

impl FromStr for TriggerMethod {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pose-delta" => Ok(TriggerMethod::PoseDelta),
            "time-interval" => Ok(TriggerMethod::TimeInterval),
            other => Err(CalibrationError::Config(format!(
                "{other} is not a supported trigger method (expected \"pose-delta\" or \"time-interval\")"
            ))),
        }
    }
}

/// Which external solver recovers the intrinsics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationMethod {
    Colmap,
}

impl FromStr for CalibrationMethod {
    type Err = CalibrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "colmap" => Ok(CalibrationMethod::Colmap),
            other => Err(CalibrationError::Config(format!(
                "{other} is not a supported calibration method (expected \"colmap\")"
            ))),
        }
    }
}

/// Parameters of one calibration run, loaded once at startup
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub camera_name: String,
    pub calibration_method: CalibrationMethod,
    pub trigger_method: TriggerMethod,
    /// Session completes after this many captures (plus the seed frame)
    pub target_frame_count: usize,
    pub parent_frame: String,
    pub child_frame: String,
    /// Translation threshold in meters (pose-delta)
    pub delta_distance: f64,
    /// Rotation threshold in degrees (pose-delta)
    pub delta_rotation_deg: f64,
    /// Elapsed-time threshold in seconds (time-interval)
    pub delta_time: f64,
}

impl SessionConfig {
    /// Validate the numeric parameters of the active trigger
    pub fn validate(&self) -> Result<()> {
        if self.target_frame_count == 0 {
            return Err(CalibrationError::Config(
                "target frame count must be at least 1".to_string(),
            ));
        }
        match self.trigger_method {
            TriggerMethod::PoseDelta => {
                if self.delta_distance <= 0.0 || self.delta_rotation_deg <= 0.0 {
                    return Err(CalibrationError::Config(format!(
                        "pose-delta thresholds must be positive (distance {} m, rotation {} deg)",
                        self.delta_distance, self.delta_rotation_deg
                    )));
                }
            }
            TriggerMethod::TimeInterval => {
                if self.delta_time <= 0.0 {
                    return Err(CalibrationError::Config(format!(
                        "time threshold must be positive ({} s)",
                        self.delta_time
                    )));
                }
            }
        }
        Ok(())
    }
}

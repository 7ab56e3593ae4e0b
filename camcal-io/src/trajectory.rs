use std::fs;
use std::path::Path;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use camcal_core::error::{CalibrationError, Result};
use camcal_core::pose::{Pose, PoseSource};

/// Recorded motion in TUM trajectory format.
///
/// One sample per line, `stamp tx ty tz qx qy qz qw`, `#` comments and
/// blank lines ignored. Acts as an offline [`PoseSource`]: a lookup
/// answers with the last sample at or before the query instant.
#[derive(Debug, Clone)]
pub struct TumTrajectory {
    samples: Vec<(f64, Pose)>,
}

impl TumTrajectory {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|err| CalibrationError::Config(format!("{}: {err}", path.display())))?;

        let mut samples = Vec::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let sample = parse_sample(line).ok_or_else(|| {
                CalibrationError::Config(format!(
                    "{}:{}: malformed trajectory line",
                    path.display(),
                    number + 1
                ))
            })?;
            samples.push(sample);
        }

        // Tolerate out-of-order recordings
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Last sample at or before `at_secs`
    fn at(&self, at_secs: f64) -> Option<Pose> {
        let index = self.samples.partition_point(|(stamp, _)| *stamp <= at_secs);
        index.checked_sub(1).map(|i| self.samples[i].1)
    }
}

impl PoseSource for TumTrajectory {
    fn lookup(&mut self, _child_frame: &str, _parent_frame: &str, at_secs: f64) -> Result<Pose> {
        self.at(at_secs).ok_or_else(|| {
            CalibrationError::PoseUnavailable(format!("no trajectory sample at or before {at_secs:.3}"))
        })
    }
}

fn parse_sample(line: &str) -> Option<(f64, Pose)> {
    let values = line
        .split_whitespace()
        .map(|token| token.parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .ok()?;
    let [stamp, tx, ty, tz, qx, qy, qz, qw] = values.as_slice() else {
        return None;
    };
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(*qw, *qx, *qy, *qz));
    Some((*stamp, Pose::new(Vector3::new(*tx, *ty, *tz), rotation)))
}

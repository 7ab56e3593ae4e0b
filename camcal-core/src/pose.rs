use nalgebra::{UnitQuaternion, Vector3};

use crate::error::Result;

/// Rigid pose of one reference frame relative to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn new(translation: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Euclidean distance between this translation and another
    pub fn translation_distance(&self, other: &Pose) -> f64 {
        (self.translation - other.translation).norm()
    }

    /// Absolute yaw component of the rotation taking `other` to `self`.
    ///
    /// Only the yaw axis is considered, matching the single-axis
    /// displacement measure used by the capture trigger.
    pub fn yaw_distance(&self, other: &Pose) -> f64 {
        let delta = self.rotation * other.rotation.inverse();
        let (_roll, _pitch, yaw) = delta.euler_angles();
        yaw.abs()
    }
}

/// Source of the relative pose between two named reference frames.
///
/// A lookup may block up to an implementation-defined bounded wait before
/// failing with `PoseUnavailable`. Offline sources interpret `at_secs` as
/// the replay instant; a live source is free to ignore it and answer with
/// its most recent transform.
pub trait PoseSource {
    fn lookup(&mut self, child_frame: &str, parent_frame: &str, at_secs: f64) -> Result<Pose>;
}

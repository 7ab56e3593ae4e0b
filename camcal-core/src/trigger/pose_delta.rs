use crate::pose::Pose;

/// Fires when the pose has moved far enough since the last accepted one.
///
/// The first evaluation always fires and seeds the baseline, so every
/// session starts with one capture regardless of motion.
#[derive(Debug)]
pub struct PoseDeltaTrigger {
    distance_threshold: f64,
    rotation_threshold: f64,
    last: Option<Pose>,
}

impl PoseDeltaTrigger {
    /// Thresholds: translation in meters, rotation in radians
    pub fn new(distance_threshold_m: f64, rotation_threshold_rad: f64) -> Self {
        Self {
            distance_threshold: distance_threshold_m,
            rotation_threshold: rotation_threshold_rad,
            last: None,
        }
    }

    /// True iff translation or yaw displacement from the last accepted
    /// pose exceeds its threshold. The baseline advances only on true.
    pub fn evaluate(&mut self, pose: &Pose) -> bool {
        match self.last {
            Some(prev) => {
                let translation = pose.translation_distance(&prev);
                let rotation = pose.yaw_distance(&prev);
                if translation > self.distance_threshold || rotation > self.rotation_threshold {
                    self.last = Some(*pose);
                    true
                } else {
                    false
                }
            }
            None => {
                self.last = Some(*pose);
                true
            }
        }
    }
}

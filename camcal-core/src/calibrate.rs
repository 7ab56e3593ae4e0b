use std::path::PathBuf;

use log::info;
use nalgebra::Matrix3;

use crate::error::Result;

/// Intrinsics recovered by the external structure-from-motion solver
#[derive(Debug, Clone)]
pub struct SfmResult {
    /// 3x3 intrinsic camera matrix
    pub camera_matrix: Matrix3<f64>,
    /// Distortion coefficients, plumb-bob order
    pub dist_coeffs: Vec<f64>,
}

/// Final calibration artifact handed to the descriptor writer
#[derive(Debug, Clone)]
pub struct CameraDescriptor {
    pub camera_name: String,
    pub image_size: (usize, usize),
    pub camera_matrix: Matrix3<f64>,
    pub dist_coeffs: Vec<f64>,
    /// Fixed placeholder, the solver does not report one
    pub reprojection_error: f64,
}

/// External solver consuming an ordered image set.
///
/// Implementations fail with `SolveFailed`; the run is not retried.
pub trait SfmSolver {
    fn execute(&self, images: &[PathBuf]) -> Result<SfmResult>;
}

/// Persists the final calibration descriptor
pub trait DescriptorWriter {
    fn write(&self, descriptor: &CameraDescriptor) -> Result<()>;
}

/// Drives the solve-and-emit pipeline once collection has finished.
///
/// Invoked exactly once per run; by the time `finalize` starts, the
/// caller has already stopped frame delivery, so the long blocking solve
/// races with nothing.
pub struct CalibrationOrchestrator<S, W> {
    solver: S,
    writer: W,
}

impl<S: SfmSolver, W: DescriptorWriter> CalibrationOrchestrator<S, W> {
    pub fn new(solver: S, writer: W) -> Self {
        Self { solver, writer }
    }

    /// Run the solver over the captured set and persist the descriptor.
    ///
    /// Solver failure propagates as `SolveFailed` without writing
    /// anything; a failed write propagates as `DescriptorWrite`.
    pub fn finalize(
        &self,
        camera_name: &str,
        images: &[PathBuf],
        image_size: (usize, usize),
    ) -> Result<()> {
        info!(
            "solving intrinsics for {} over {} images",
            camera_name,
            images.len()
        );
        let solved = self.solver.execute(images)?;

        self.writer.write(&CameraDescriptor {
            camera_name: camera_name.to_string(),
            image_size,
            camera_matrix: solved.camera_matrix,
            dist_coeffs: solved.dist_coeffs,
            reprojection_error: 0.0,
        })?;

        info!("calibration for {} written", camera_name);
        Ok(())
    }
}

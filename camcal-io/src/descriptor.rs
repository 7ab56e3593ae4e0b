use std::fs::File;
use std::path::PathBuf;

use serde::Serialize;

use camcal_core::calibrate::{CameraDescriptor, DescriptorWriter};
use camcal_core::error::{CalibrationError, Result};

/// OpenCV-style matrix block: `{rows, cols, data}`
#[derive(Debug, Serialize)]
struct OpencvMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct DescriptorDocument<'a> {
    camera_name: &'a str,
    image_width: usize,
    image_height: usize,
    camera_matrix: OpencvMatrix,
    distortion_coefficients: OpencvMatrix,
    reprojection_error: f64,
}

/// Writes the calibration descriptor as OpenCV-style YAML
#[derive(Debug)]
pub struct YamlDescriptorWriter {
    path: PathBuf,
}

impl YamlDescriptorWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DescriptorWriter for YamlDescriptorWriter {
    fn write(&self, descriptor: &CameraDescriptor) -> Result<()> {
        if descriptor.dist_coeffs.is_empty() {
            return Err(CalibrationError::DescriptorWrite(
                "empty distortion coefficient vector".to_string(),
            ));
        }

        let document = DescriptorDocument {
            camera_name: &descriptor.camera_name,
            image_width: descriptor.image_size.0,
            image_height: descriptor.image_size.1,
            camera_matrix: OpencvMatrix {
                rows: 3,
                cols: 3,
                // nalgebra stores column-major, OpenCV expects row-major
                data: descriptor.camera_matrix.transpose().iter().copied().collect(),
            },
            distortion_coefficients: OpencvMatrix {
                rows: 1,
                cols: descriptor.dist_coeffs.len(),
                data: descriptor.dist_coeffs.clone(),
            },
            reprojection_error: descriptor.reprojection_error,
        };

        let file = File::create(&self.path).map_err(|err| {
            CalibrationError::DescriptorWrite(format!("{}: {err}", self.path.display()))
        })?;
        serde_yaml::to_writer(file, &document).map_err(|err| {
            CalibrationError::DescriptorWrite(format!("{}: {err}", self.path.display()))
        })
    }
}

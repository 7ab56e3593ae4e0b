use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info};
use nalgebra::Matrix3;

use camcal_core::calibrate::{SfmResult, SfmSolver};
use camcal_core::error::{CalibrationError, Result};

/// Errors from the COLMAP subprocess pipeline and model parsing
#[derive(Debug, thiserror::Error)]
pub enum ColmapError {
    #[error("failed to spawn {0}: {1}")]
    Spawn(String, std::io::Error),

    #[error("{0} exited with {1}")]
    NonZeroExit(String, std::process::ExitStatus),

    #[error("error reading {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("cameras.txt contains no camera entries")]
    NoCameras,

    #[error("malformed camera line: {0}")]
    MalformedCamera(String),

    #[error("unsupported camera model {0}")]
    UnsupportedModel(String),
}

impl From<ColmapError> for CalibrationError {
    fn from(err: ColmapError) -> Self {
        CalibrationError::SolveFailed(err.to_string())
    }
}

/// External COLMAP sparse reconstruction used as the intrinsics solver.
///
/// Runs `feature_extractor`, `exhaustive_matcher` and `mapper` over the
/// collected image set with a single shared OPENCV camera, converts the
/// first recovered model to text and reads the intrinsics back from
/// `cameras.txt`.
pub struct ColmapSolver {
    workspace: PathBuf,
    executable: String,
}

impl ColmapSolver {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            executable: "colmap".to_string(),
        }
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Whether the solver executable can be spawned at all
    pub fn available(&self) -> bool {
        Command::new(&self.executable)
            .arg("help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    fn run(&self, subcommand: &str, args: &[(&str, &Path)]) -> std::result::Result<(), ColmapError> {
        let mut command = Command::new(&self.executable);
        command.arg(subcommand);
        for (flag, value) in args {
            command.arg(flag).arg(value);
        }
        debug!("running {} {subcommand}", self.executable);
        let status = command
            .status()
            .map_err(|err| ColmapError::Spawn(self.executable.clone(), err))?;
        if !status.success() {
            return Err(ColmapError::NonZeroExit(subcommand.to_string(), status));
        }
        Ok(())
    }
}

impl SfmSolver for ColmapSolver {
    fn execute(&self, images: &[PathBuf]) -> Result<SfmResult> {
        // All captured frames live flat in the session working directory
        let image_dir = images
            .first()
            .and_then(|path| path.parent())
            .ok_or_else(|| CalibrationError::SolveFailed("empty image set".to_string()))?;

        let database = self.workspace.join("database.db");
        let sparse = self.workspace.join("sparse");
        fs::create_dir_all(&sparse).map_err(|err| ColmapError::Io(sparse.clone(), err))?;

        info!("running structure from motion over {} images", images.len());
        self.run(
            "feature_extractor",
            &[
                ("--database_path", database.as_path()),
                ("--image_path", image_dir),
                ("--ImageReader.single_camera", Path::new("1")),
                ("--ImageReader.camera_model", Path::new("OPENCV")),
            ],
        )?;
        self.run("exhaustive_matcher", &[("--database_path", database.as_path())])?;
        self.run(
            "mapper",
            &[
                ("--database_path", database.as_path()),
                ("--image_path", image_dir),
                ("--output_path", sparse.as_path()),
            ],
        )?;

        // The mapper numbers reconstructed models from 0
        let model = sparse.join("0");
        self.run(
            "model_converter",
            &[
                ("--input_path", model.as_path()),
                ("--output_path", model.as_path()),
                ("--output_type", Path::new("TXT")),
            ],
        )?;

        Ok(read_cameras_txt(&model.join("cameras.txt"))?)
    }
}

/// Parse the first camera entry of a COLMAP `cameras.txt` model file.
///
/// Format per line: `CAMERA_ID MODEL WIDTH HEIGHT PARAMS[]`, with `#`
/// comment lines interleaved at the top.
fn read_cameras_txt(path: &Path) -> std::result::Result<SfmResult, ColmapError> {
    let text = fs::read_to_string(path).map_err(|err| ColmapError::Io(path.to_path_buf(), err))?;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        return parse_camera_line(line);
    }
    Err(ColmapError::NoCameras)
}

fn parse_camera_line(line: &str) -> std::result::Result<SfmResult, ColmapError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 {
        return Err(ColmapError::MalformedCamera(line.to_string()));
    }

    let model = tokens[1];
    let params = tokens[4..]
        .iter()
        .map(|token| token.parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|_| ColmapError::MalformedCamera(line.to_string()))?;

    // Intrinsics + plumb-bob [k1, k2, p1, p2, k3] per model
    let (fx, fy, cx, cy, dist) = match (model, params.as_slice()) {
        ("OPENCV", [fx, fy, cx, cy, k1, k2, p1, p2]) => {
            (*fx, *fy, *cx, *cy, vec![*k1, *k2, *p1, *p2, 0.0])
        }
        ("PINHOLE", [fx, fy, cx, cy]) => (*fx, *fy, *cx, *cy, vec![0.0; 5]),
        ("SIMPLE_RADIAL", [f, cx, cy, k]) => (*f, *f, *cx, *cy, vec![*k, 0.0, 0.0, 0.0, 0.0]),
        ("RADIAL", [f, cx, cy, k1, k2]) => (*f, *f, *cx, *cy, vec![*k1, *k2, 0.0, 0.0, 0.0]),
        ("OPENCV" | "PINHOLE" | "SIMPLE_RADIAL" | "RADIAL", _) => {
            return Err(ColmapError::MalformedCamera(line.to_string()));
        }
        (other, _) => return Err(ColmapError::UnsupportedModel(other.to_string())),
    };

    Ok(SfmResult {
        camera_matrix: Matrix3::new(
            fx, 0.0, cx, //
            0.0, fy, cy, //
            0.0, 0.0, 1.0,
        ),
        dist_coeffs: dist,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_opencv_camera_line() {
        let result =
            parse_camera_line("1 OPENCV 1920 1080 1000.5 1001.5 960.0 540.0 -0.1 0.05 0.001 -0.001")
                .unwrap();

        assert_eq!(result.camera_matrix[(0, 0)], 1000.5);
        assert_eq!(result.camera_matrix[(1, 1)], 1001.5);
        assert_eq!(result.camera_matrix[(0, 2)], 960.0);
        assert_eq!(result.camera_matrix[(1, 2)], 540.0);
        assert_eq!(result.camera_matrix[(2, 2)], 1.0);
        assert_eq!(result.camera_matrix[(1, 0)], 0.0);
        assert_eq!(result.dist_coeffs, vec![-0.1, 0.05, 0.001, -0.001, 0.0]);
    }

    #[test]
    fn test_parse_simple_radial_shares_focal_length() {
        let result = parse_camera_line("1 SIMPLE_RADIAL 640 480 800.0 320.0 240.0 -0.2").unwrap();
        assert_eq!(result.camera_matrix[(0, 0)], 800.0);
        assert_eq!(result.camera_matrix[(1, 1)], 800.0);
        assert_eq!(result.dist_coeffs, vec![-0.2, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_parse_unsupported_model() {
        let err = parse_camera_line("1 FOV 640 480 800.0 320.0 240.0 0.9").unwrap_err();
        assert!(matches!(err, ColmapError::UnsupportedModel(_)));
    }

    #[test]
    fn test_parse_wrong_param_count() {
        let err = parse_camera_line("1 OPENCV 1920 1080 1000.0 1000.0").unwrap_err();
        assert!(matches!(err, ColmapError::MalformedCamera(_)));
    }

    #[test]
    fn test_read_cameras_txt_skips_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cameras.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "# Camera list with one line of data per camera:").unwrap();
        writeln!(file, "#   CAMERA_ID, MODEL, WIDTH, HEIGHT, PARAMS[]").unwrap();
        writeln!(file, "# Number of cameras: 1").unwrap();
        writeln!(
            file,
            "1 OPENCV 1920 1080 1000.0 1000.0 960.0 540.0 -0.1 0.05 0.0 0.0"
        )
        .unwrap();

        let result = read_cameras_txt(&path).unwrap();
        assert_eq!(result.camera_matrix[(0, 0)], 1000.0);
        assert_eq!(result.dist_coeffs.len(), 5);
    }

    #[test]
    fn test_read_cameras_txt_empty_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cameras.txt");
        fs::write(&path, "# Number of cameras: 0\n").unwrap();

        let err = read_cameras_txt(&path).unwrap_err();
        assert!(matches!(err, ColmapError::NoCameras));
    }

    #[test]
    fn test_unavailable_executable() {
        let solver =
            ColmapSolver::new("/tmp/ws").with_executable("definitely-not-a-real-solver-binary");
        assert!(!solver.available());
    }

    #[test]
    fn test_execute_with_empty_image_set() {
        let solver = ColmapSolver::new("/tmp/ws");
        let err = solver.execute(&[]).unwrap_err();
        assert!(matches!(err, CalibrationError::SolveFailed(_)));
    }
}

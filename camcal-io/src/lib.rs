//! File and process I/O collaborators for the calibration node

pub mod colmap;
pub mod descriptor;
pub mod frame;
pub mod trajectory;

pub use colmap::{ColmapError, ColmapSolver};
pub use descriptor::YamlDescriptorWriter;
pub use frame::{PngFrameStore, load_frame};
pub use trajectory::TumTrajectory;

// Re-export from camcal-core for convenience
pub use camcal_core::error::{CalibrationError, Result};

use std::path::Path;

use camcal_core::error::{CalibrationError, Result};
use camcal_core::session::{Frame, FrameSink};

/// Persists captured frames as RGB8 PNG files
#[derive(Debug, Default)]
pub struct PngFrameStore;

impl FrameSink for PngFrameStore {
    fn store(&self, frame: &Frame, path: &Path) -> Result<()> {
        let buffer: image::RgbImage =
            image::ImageBuffer::from_raw(frame.width as u32, frame.height as u32, frame.data.clone())
                .ok_or_else(|| {
                    CalibrationError::Capture(format!(
                        "frame buffer length {} does not match {}x{} rgb8",
                        frame.data.len(),
                        frame.width,
                        frame.height
                    ))
                })?;
        buffer
            .save(path)
            .map_err(|err| CalibrationError::Capture(format!("{}: {err}", path.display())))
    }
}

/// Load a color image from disk as an RGB8 frame
pub fn load_frame(path: &Path, stamp_secs: f64) -> Result<Frame> {
    let rgb = image::open(path)
        .map_err(|err| CalibrationError::Capture(format!("{}: {err}", path.display())))?
        .to_rgb8();
    Ok(Frame {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
        data: rgb.into_raw(),
        stamp_secs,
    })
}

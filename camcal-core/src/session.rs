use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::Result;
use crate::trigger::CaptureTrigger;

/// Decoded color frame handed to the session
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    /// Packed RGB8 pixels, row-major
    pub data: Vec<u8>,
    /// Capture time in seconds, source-defined epoch
    pub stamp_secs: f64,
}

/// Destination for captured frames
pub trait FrameSink {
    fn store(&self, frame: &Frame, path: &Path) -> Result<()>;
}

/// What happened to one incoming frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Not novel enough, nothing changed
    Skipped,
    /// Persisted and counted
    Captured,
    /// Persisted and counted, and the target count is now reached
    SessionComplete,
}

/// Bounded collection of calibration frames.
///
/// Owns all mutable session state; frames are fed one at a time through
/// [`CaptureSession::on_frame`] and never concurrently.
pub struct CaptureSession {
    working_directory: PathBuf,
    target_frame_count: usize,
    trigger: CaptureTrigger,
    captured_paths: Vec<PathBuf>,
    frame_counter: usize,
    image_size: Option<(usize, usize)>,
}

impl CaptureSession {
    pub fn new(
        working_directory: PathBuf,
        target_frame_count: usize,
        trigger: CaptureTrigger,
    ) -> Self {
        Self {
            working_directory,
            target_frame_count,
            trigger,
            captured_paths: Vec::new(),
            frame_counter: 0,
            image_size: None,
        }
    }

    /// Evaluate one incoming frame.
    ///
    /// A sink failure leaves the counter and path list untouched; the
    /// caller may keep feeding frames afterwards.
    pub fn on_frame<S: FrameSink>(&mut self, frame: &Frame, sink: &S) -> Result<CaptureOutcome> {
        if self.frame_counter == 0 {
            self.image_size = Some((frame.width, frame.height));
        } else if self.image_size != Some((frame.width, frame.height)) {
            warn!(
                "skipping {}x{} frame, session started at {:?}",
                frame.width, frame.height, self.image_size
            );
            return Ok(CaptureOutcome::Skipped);
        }

        if !self.trigger.fire(frame) {
            return Ok(CaptureOutcome::Skipped);
        }

        // Zero-padded 5-digit names keep the solver's image set ordered;
        // the scheme is collision-free up to 99999 frames.
        let path = self
            .working_directory
            .join(format!("{:05}.png", self.frame_counter));
        sink.store(frame, &path)?;

        self.captured_paths.push(path.clone());
        self.frame_counter += 1;
        info!(
            "collecting image {} / {} -> {}",
            self.frame_counter,
            self.target_frame_count,
            path.display()
        );

        if self.frame_counter > self.target_frame_count {
            return Ok(CaptureOutcome::SessionComplete);
        }
        Ok(CaptureOutcome::Captured)
    }

    /// Captured frame files in capture order
    pub fn captured_paths(&self) -> &[PathBuf] {
        &self.captured_paths
    }

    pub fn frame_counter(&self) -> usize {
        self.frame_counter
    }

    /// (width, height) recorded from the first observed frame
    pub fn image_size(&self) -> Option<(usize, usize)> {
        self.image_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CalibrationError, Result};
    use crate::pose::{Pose, PoseSource};
    use crate::trigger::PoseDeltaTrigger;
    use nalgebra::{UnitQuaternion, Vector3};
    use std::cell::RefCell;

    /// Records stored paths in memory instead of touching disk
    #[derive(Default)]
    struct MemorySink {
        stored: RefCell<Vec<PathBuf>>,
        fail: bool,
    }

    impl FrameSink for MemorySink {
        fn store(&self, _frame: &Frame, path: &Path) -> Result<()> {
            if self.fail {
                return Err(CalibrationError::Capture("disk full".to_string()));
            }
            self.stored.borrow_mut().push(path.to_path_buf());
            Ok(())
        }
    }

    /// Moves 10 m along x on every lookup, so every frame triggers
    struct AlwaysMoving {
        x: f64,
    }

    impl PoseSource for AlwaysMoving {
        fn lookup(&mut self, _child: &str, _parent: &str, _at: f64) -> Result<Pose> {
            self.x += 10.0;
            Ok(Pose::new(
                Vector3::new(self.x, 0.0, 0.0),
                UnitQuaternion::identity(),
            ))
        }
    }

    /// Returns the same pose forever, so only the seed frame triggers
    struct Stationary;

    impl PoseSource for Stationary {
        fn lookup(&mut self, _child: &str, _parent: &str, _at: f64) -> Result<Pose> {
            Ok(Pose::identity())
        }
    }

    fn trigger(source: impl PoseSource + 'static) -> CaptureTrigger {
        CaptureTrigger::PoseDelta {
            trigger: PoseDeltaTrigger::new(5.0, 3.0_f64.to_radians()),
            source: Box::new(source),
            child_frame: "base_link".to_string(),
            parent_frame: "world".to_string(),
        }
    }

    fn frame(width: usize, height: usize) -> Frame {
        Frame {
            width,
            height,
            data: vec![0; width * height * 3],
            stamp_secs: 0.0,
        }
    }

    fn session(target: usize, source: impl PoseSource + 'static) -> CaptureSession {
        CaptureSession::new(PathBuf::from("/tmp/session"), target, trigger(source))
    }

    #[test]
    fn test_collects_one_past_target() {
        // The completion check is strictly-greater after the increment,
        // so a target of 3 collects 4 frames. Kept for compatibility
        // with the behavior this tool replaces.
        let mut session = session(3, AlwaysMoving { x: 0.0 });
        let sink = MemorySink::default();

        for _ in 0..3 {
            assert_eq!(
                session.on_frame(&frame(640, 480), &sink).unwrap(),
                CaptureOutcome::Captured
            );
        }
        assert_eq!(
            session.on_frame(&frame(640, 480), &sink).unwrap(),
            CaptureOutcome::SessionComplete
        );

        assert_eq!(session.frame_counter(), 4);
        assert_eq!(session.captured_paths().len(), 4);
        let names: Vec<_> = session
            .captured_paths()
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["00000.png", "00001.png", "00002.png", "00003.png"]);
        assert_eq!(sink.stored.borrow().len(), 4);
    }

    #[test]
    fn test_skipped_frames_mutate_nothing() {
        let mut session = session(10, Stationary);
        let sink = MemorySink::default();

        // Seed capture
        assert_eq!(
            session.on_frame(&frame(640, 480), &sink).unwrap(),
            CaptureOutcome::Captured
        );
        for _ in 0..5 {
            assert_eq!(
                session.on_frame(&frame(640, 480), &sink).unwrap(),
                CaptureOutcome::Skipped
            );
        }
        assert_eq!(session.frame_counter(), 1);
        assert_eq!(session.captured_paths().len(), 1);
    }

    #[test]
    fn test_image_size_recorded_from_first_frame() {
        let mut session = session(10, AlwaysMoving { x: 0.0 });
        let sink = MemorySink::default();

        assert_eq!(session.image_size(), None);
        session.on_frame(&frame(1920, 1080), &sink).unwrap();
        assert_eq!(session.image_size(), Some((1920, 1080)));
    }

    #[test]
    fn test_mismatched_frame_size_is_skipped() {
        let mut session = session(10, AlwaysMoving { x: 0.0 });
        let sink = MemorySink::default();

        session.on_frame(&frame(640, 480), &sink).unwrap();
        assert_eq!(
            session.on_frame(&frame(1920, 1080), &sink).unwrap(),
            CaptureOutcome::Skipped
        );
        // The recorded size and counters are untouched
        assert_eq!(session.image_size(), Some((640, 480)));
        assert_eq!(session.frame_counter(), 1);

        // Matching frames keep flowing afterwards
        assert_eq!(
            session.on_frame(&frame(640, 480), &sink).unwrap(),
            CaptureOutcome::Captured
        );
    }

    #[test]
    fn test_sink_failure_does_not_advance_counter() {
        let mut session = session(10, AlwaysMoving { x: 0.0 });
        let sink = MemorySink {
            fail: true,
            ..MemorySink::default()
        };

        let err = session.on_frame(&frame(640, 480), &sink).unwrap_err();
        assert!(matches!(err, CalibrationError::Capture(_)));
        assert_eq!(session.frame_counter(), 0);
        assert!(session.captured_paths().is_empty());

        // Recoverable per-tick: the next frame captures normally
        let ok_sink = MemorySink::default();
        assert_eq!(
            session.on_frame(&frame(640, 480), &ok_sink).unwrap(),
            CaptureOutcome::Captured
        );
        assert_eq!(
            session.captured_paths()[0].file_name().unwrap(),
            "00000.png"
        );
    }

    #[test]
    fn test_stationary_after_jump_sequence() {
        // Poses x=0, x=6, x=6 against 5 m / 3 deg thresholds
        struct Jump {
            calls: usize,
        }
        impl PoseSource for Jump {
            fn lookup(&mut self, _c: &str, _p: &str, _at: f64) -> Result<Pose> {
                let x = if self.calls == 0 { 0.0 } else { 6.0 };
                self.calls += 1;
                Ok(Pose::new(Vector3::new(x, 0.0, 0.0), UnitQuaternion::identity()))
            }
        }

        let mut session = session(10, Jump { calls: 0 });
        let sink = MemorySink::default();
        let outcomes: Vec<_> = (0..3)
            .map(|_| session.on_frame(&frame(640, 480), &sink).unwrap())
            .collect();
        assert_eq!(
            outcomes,
            [
                CaptureOutcome::Captured,
                CaptureOutcome::Captured,
                CaptureOutcome::Skipped
            ]
        );
    }
}

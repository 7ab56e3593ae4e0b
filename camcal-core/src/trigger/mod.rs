//! Capture-triggering state machines

mod pose_delta;
mod time_interval;

pub use pose_delta::PoseDeltaTrigger;
pub use time_interval::TimeIntervalTrigger;

use log::warn;

use crate::pose::PoseSource;
use crate::session::Frame;

/// Active capture trigger, selected once at configuration time.
///
/// The pose-delta variant owns its pose source; a lookup failure is
/// logged and treated as not-triggered for that tick, without touching
/// the trigger baseline. The time-interval variant runs off the frame's
/// own capture stamp, so replayed sequences are gated by scene time
/// rather than delivery speed.
pub enum CaptureTrigger {
    PoseDelta {
        trigger: PoseDeltaTrigger,
        source: Box<dyn PoseSource>,
        child_frame: String,
        parent_frame: String,
    },
    TimeInterval(TimeIntervalTrigger),
}

impl std::fmt::Debug for CaptureTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureTrigger::PoseDelta {
                trigger,
                child_frame,
                parent_frame,
                ..
            } => f
                .debug_struct("PoseDelta")
                .field("trigger", trigger)
                .field("child_frame", child_frame)
                .field("parent_frame", parent_frame)
                .finish_non_exhaustive(),
            CaptureTrigger::TimeInterval(trigger) => {
                f.debug_tuple("TimeInterval").field(trigger).finish()
            }
        }
    }
}

impl CaptureTrigger {
    /// Decide whether `frame` is worth capturing
    pub fn fire(&mut self, frame: &Frame) -> bool {
        match self {
            CaptureTrigger::PoseDelta {
                trigger,
                source,
                child_frame,
                parent_frame,
            } => match source.lookup(child_frame, parent_frame, frame.stamp_secs) {
                Ok(pose) => trigger.evaluate(&pose),
                Err(err) => {
                    warn!("skipping frame, pose lookup failed: {err}");
                    false
                }
            },
            CaptureTrigger::TimeInterval(trigger) => trigger.evaluate(frame.stamp_secs),
        }
    }
}

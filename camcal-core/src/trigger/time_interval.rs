/// Fires when enough time has passed since the last accepted frame.
///
/// Time is the frame's own capture stamp in seconds, so the trigger
/// measures elapsed scene time regardless of how fast frames are
/// delivered. The first evaluation always fires and records the
/// baseline stamp.
#[derive(Debug)]
pub struct TimeIntervalTrigger {
    interval_secs: f64,
    last_secs: Option<f64>,
}

impl TimeIntervalTrigger {
    pub fn new(interval_secs: f64) -> Self {
        Self {
            interval_secs,
            last_secs: None,
        }
    }

    /// True iff more than the configured interval separates `now_secs`
    /// from the last accepted stamp. The baseline advances only on true.
    pub fn evaluate(&mut self, now_secs: f64) -> bool {
        match self.last_secs {
            Some(prev) => {
                if now_secs - prev > self.interval_secs {
                    self.last_secs = Some(now_secs);
                    true
                } else {
                    false
                }
            }
            None => {
                self.last_secs = Some(now_secs);
                true
            }
        }
    }
}

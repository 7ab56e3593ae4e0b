use thiserror::Error;

/// Common errors across the calibration capture pipeline
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Pose unavailable: {0}")]
    PoseUnavailable(String),

    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error("Structure-from-motion solve failed: {0}")]
    SolveFailed(String),

    #[error("Descriptor write failed: {0}")]
    DescriptorWrite(String),
}

impl CalibrationError {
    /// Fatal errors end the run; the rest only skip the current frame.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CalibrationError::Config(_)
                | CalibrationError::SolveFailed(_)
                | CalibrationError::DescriptorWrite(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CalibrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CalibrationError::Config("timer is not a supported method".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: timer is not a supported method"
        );

        let err = CalibrationError::PoseUnavailable("no pose before 0.500".to_string());
        assert_eq!(err.to_string(), "Pose unavailable: no pose before 0.500");

        let err = CalibrationError::SolveFailed("mapper exited with 1".to_string());
        assert_eq!(
            err.to_string(),
            "Structure-from-motion solve failed: mapper exited with 1"
        );
    }

    #[test]
    fn test_fatal_classification() {
        assert!(CalibrationError::Config("x".into()).is_fatal());
        assert!(CalibrationError::SolveFailed("x".into()).is_fatal());
        assert!(CalibrationError::DescriptorWrite("x".into()).is_fatal());
        assert!(!CalibrationError::PoseUnavailable("x".into()).is_fatal());
        assert!(!CalibrationError::Capture("x".into()).is_fatal());
    }
}

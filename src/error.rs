//! Error handling for Mediaplay
//!
//! Every error carries a stable code and recovery suggestions so the UI
//! surface can report it without string matching. Nothing in the core
//! treats these as fatal: the player downgrades them to reported events.

use thiserror::Error;

/// Result type alias for Mediaplay operations
pub type Result<T> = std::result::Result<T, MediaError>;

/// Main error type for Mediaplay operations
#[derive(Error, Debug)]
pub enum MediaError {
    // Transport Errors
    #[error("No media loaded")]
    NoMediaLoaded,

    #[error("Render engine failed to start: {reason}")]
    EngineStart { reason: String },

    // Load Errors
    #[error("Media not found: {path}")]
    MediaNotFound { path: String },

    #[error("Could not decode media: {reason}")]
    DecodeError {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MediaError {
    /// Build a decode error without an underlying cause
    pub fn decode(reason: impl Into<String>) -> Self {
        MediaError::DecodeError {
            reason: reason.into(),
            source: None,
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            MediaError::NoMediaLoaded => "NO_MEDIA_LOADED",
            MediaError::EngineStart { .. } => "ENGINE_START_ERROR",
            MediaError::MediaNotFound { .. } => "MEDIA_NOT_FOUND",
            MediaError::DecodeError { .. } => "DECODE_ERROR",
            MediaError::Config { .. } => "CONFIG_ERROR",
            MediaError::Io(_) => "IO_ERROR",
            MediaError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the player can keep accepting commands after this error
    ///
    /// Load failures are recoverable only by loading another resource, so
    /// they report `false` here.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MediaError::NoMediaLoaded | MediaError::EngineStart { .. } | MediaError::Config { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            MediaError::NoMediaLoaded => vec!["Load a media file before using transport controls"],
            MediaError::EngineStart { .. } => vec![
                "Check that the output device is not in use by another application",
                "Press play again once the device is available",
            ],
            MediaError::MediaNotFound { .. } => vec![
                "Check the file path is correct",
                "Verify the file hasn't been moved or deleted",
            ],
            MediaError::DecodeError { .. } => vec![
                "Check if the file plays in another application",
                "Convert the file to 16/24-bit PCM or 32-bit float WAV",
            ],
            MediaError::Config { .. } => vec!["Fix the configuration file or remove it to use defaults"],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(MediaError::NoMediaLoaded.error_code(), "NO_MEDIA_LOADED");
        let err = MediaError::EngineStart {
            reason: "device busy".to_string(),
        };
        assert_eq!(err.error_code(), "ENGINE_START_ERROR");
        assert_eq!(err.to_string(), "Render engine failed to start: device busy");
    }

    #[test]
    fn test_recoverability() {
        assert!(MediaError::NoMediaLoaded.is_recoverable());
        assert!(!MediaError::decode("truncated header").is_recoverable());
        assert!(!MediaError::MediaNotFound {
            path: "missing.wav".to_string()
        }
        .is_recoverable());
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = MediaError::MediaNotFound {
            path: "sample.wav".to_string(),
        };
        assert!(!err.recovery_suggestions().is_empty());
    }
}

//! Error handling for the equalizer engine
//!
//! The filter core itself is infallible. Errors only arise at the
//! boundaries: parameter lookup, host lifecycle, configuration and file I/O.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EqError>;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EqError {
    // Parameter Errors
    #[error("Unknown parameter: {id}")]
    UnknownParameter { id: String },

    #[error("Invalid value for {param}: {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Lifecycle Errors
    #[error("Invalid sample rate: {sample_rate} Hz")]
    InvalidSampleRate { sample_rate: f64 },

    #[error("Processor used before prepare()")]
    NotPrepared,

    #[error("Block of {block_size} samples exceeds announced maximum of {max_block_size}")]
    BlockTooLarge {
        block_size: usize,
        max_block_size: usize,
    },

    #[error("Unsupported channel layout: {input_channels} in / {output_channels} out")]
    UnsupportedLayout {
        input_channels: usize,
        output_channels: usize,
    },

    #[error("Channel length mismatch: left has {left} samples, right has {right}")]
    ChannelLengthMismatch { left: usize, right: usize },

    // File Errors
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid audio file: {reason}")]
    InvalidAudio { reason: String },

    #[error("Unsupported audio format: {format}")]
    UnsupportedFormat { format: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl EqError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            EqError::UnknownParameter { .. } => "UNKNOWN_PARAMETER",
            EqError::InvalidParameter { .. } => "INVALID_PARAMETER",
            EqError::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            EqError::NotPrepared => "NOT_PREPARED",
            EqError::BlockTooLarge { .. } => "BLOCK_TOO_LARGE",
            EqError::UnsupportedLayout { .. } => "UNSUPPORTED_LAYOUT",
            EqError::ChannelLengthMismatch { .. } => "CHANNEL_LENGTH_MISMATCH",
            EqError::FileNotFound { .. } => "FILE_NOT_FOUND",
            EqError::InvalidAudio { .. } => "INVALID_AUDIO",
            EqError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            EqError::Io(_) => "IO_ERROR",
            EqError::Wav(_) => "WAV_ERROR",
            EqError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the processor in a usable state; the caller
    /// can fix its input and try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EqError::UnknownParameter { .. }
                | EqError::InvalidParameter { .. }
                | EqError::NotPrepared
                | EqError::BlockTooLarge { .. }
                | EqError::ChannelLengthMismatch { .. }
                | EqError::FileNotFound { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            EqError::UnknownParameter { .. } => vec![
                "Valid ids: LC_freq, HC_freq, PD_freq, PD_gain, PD_q, LC_slope, HC_slope",
                "Bypass toggles: LC_bypass, PD_bypass, HC_bypass",
            ],
            EqError::InvalidSampleRate { .. } => {
                vec!["Sample rate must be a positive, finite number of Hz"]
            }
            EqError::NotPrepared => vec!["Call prepare() with the stream's sample rate first"],
            EqError::BlockTooLarge { .. } => vec![
                "Split the block into chunks no larger than the announced maximum",
                "Call prepare() again with a larger maximum block size",
            ],
            EqError::UnsupportedLayout { .. } => vec![
                "Only mono and stereo layouts are supported",
                "Input and output layouts must match",
            ],
            EqError::FileNotFound { .. } => vec!["Check the file path is correct"],
            EqError::UnsupportedFormat { .. } => vec![
                "Convert to a mono or stereo WAV file",
                "Supported bit depths: 16, 24, 32",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = EqError::UnknownParameter {
            id: "LC_gain".to_string(),
        };
        assert_eq!(err.error_code(), "UNKNOWN_PARAMETER");
        assert_eq!(EqError::NotPrepared.error_code(), "NOT_PREPARED");
    }

    #[test]
    fn test_recovery_suggestions() {
        let err = EqError::BlockTooLarge {
            block_size: 8192,
            max_block_size: 512,
        };
        assert!(!err.recovery_suggestions().is_empty());
        assert!(err.is_recoverable());

        let err = EqError::UnsupportedLayout {
            input_channels: 6,
            output_channels: 6,
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = EqError::ChannelLengthMismatch {
            left: 128,
            right: 64,
        };
        let message = err.to_string();
        assert!(message.contains("128"));
        assert!(message.contains("64"));
    }
}

// SPDX-License-Identifier: MPL-2.0

//! Error types for the retro camera pipeline
//!
//! The filter chain itself never fails: every stage has a fallback. These
//! errors only surface at the edges (buffer validation, worker channels,
//! configuration and file I/O).

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame pipeline errors
    Pipeline(PipelineError),
    /// Still capture errors
    Capture(CaptureError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors raised while feeding frames into the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Pixel buffer dimensions or stride do not match its data
    InvalidBuffer(String),
    /// The frame worker thread is no longer running
    WorkerStopped,
    /// The worker is behind; the frame was not queued
    FrameDropped,
    /// Look name not present in the catalog
    UnknownLook(String),
}

/// Still capture errors
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// Neither a composited frame nor raw still data was available
    NoFrameAvailable,
    /// The worker shut down before answering
    WorkerStopped,
    /// Encoding failed
    EncodingFailed(String),
    /// Save failed
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Pipeline(e) => write!(f, "Pipeline error: {}", e),
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidBuffer(msg) => write!(f, "Invalid pixel buffer: {}", msg),
            PipelineError::WorkerStopped => write!(f, "Frame worker is not running"),
            PipelineError::FrameDropped => write!(f, "Frame worker busy, frame dropped"),
            PipelineError::UnknownLook(name) => write!(f, "Unknown look: {}", name),
        }
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::NoFrameAvailable => write!(f, "No frame available for capture"),
            CaptureError::WorkerStopped => write!(f, "Frame worker stopped before capture"),
            CaptureError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            CaptureError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PipelineError {}
impl std::error::Error for CaptureError {}

// Conversions from sub-errors to AppError
impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::Pipeline(err)
    }
}

impl From<CaptureError> for AppError {
    fn from(err: CaptureError) -> Self {
        AppError::Capture(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::SaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_wraps_sub_errors() {
        let err: AppError = CaptureError::NoFrameAvailable.into();
        assert_eq!(
            err.to_string(),
            "Capture error: No frame available for capture"
        );

        let err: AppError = PipelineError::UnknownLook("Kodachrome".into()).into();
        assert_eq!(err.to_string(), "Pipeline error: Unknown look: Kodachrome");
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(AppError::from(io), AppError::Storage(_)));
    }
}

//! # Error Types
//!
//! Custom error types for Daydream Controls using `thiserror`.
//!
//! Only the outer surfaces (configuration, device enumeration, event logging)
//! produce errors. Input reconciliation never fails: unmatched devices,
//! unmapped buttons and missing meshes degrade to no-ops.

use thiserror::Error;

/// Main error type for Daydream Controls
#[derive(Debug, Error)]
pub enum ControlsError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Color string is not `#RGB` or `#RRGGBB`
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Handedness string is not `left`, `right` or empty
    #[error("Invalid hand: {0}")]
    InvalidHand(String),

    /// Input device enumeration errors
    #[error("Device error: {0}")]
    Device(String),

    /// Event log serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Daydream Controls
pub type Result<T> = std::result::Result<T, ControlsError>;

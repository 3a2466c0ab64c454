//! Error types crossing the backend seams.
//!
//! Only construction can fail. After a renderer exists, every per-frame
//! fault is logged and folded into an outcome value instead of an `Err`.

use thiserror::Error;

/// Failure reported by an audio device library call (negative errno style).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct DeviceError {
    pub code: i32,
    pub message: String,
}

impl DeviceError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Non-OK status returned by the AAC decoder library.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal renderer construction failure.
///
/// No partially built renderer is ever handed out alongside one of these.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("aacDecoder open failed: {0}")]
    DecoderOpen(#[source] DecodeError),
    #[error("unable to apply raw decoder config: {0}")]
    DecoderConfig(#[source] DecodeError),
    #[error("unable to open audio device {device}: {source}")]
    DeviceOpen {
        device: String,
        #[source]
        source: DeviceError,
    },
    #[error("unable to configure audio device {device}: {source}")]
    DeviceConfig {
        device: String,
        #[source]
        source: DeviceError,
    },
}

impl InitError {
    /// Stable negative code for external diagnostics.
    pub fn code(&self) -> i32 {
        match self {
            InitError::DecoderOpen(_) => -1,
            InitError::DecoderConfig(_) => -2,
            InitError::DeviceOpen { .. } => -51,
            InitError::DeviceConfig { .. } => -52,
        }
    }
}

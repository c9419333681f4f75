//! # Error Types Module
//!
//! Centralized error handling for the overlay.
//!
//! ## Error Types
//! - `ConfigError`: Configuration file I/O and parsing errors
//! - `PollError`: Heart-rate server request and decoding errors
//!
//! The render path has no error type: drawing problems are logged and the
//! frame is dropped.

use std::fmt;

/// Errors that can occur during configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read config file
    ReadFailed(std::io::Error),
    /// Failed to write config file
    WriteFailed(std::io::Error),
    /// Failed to parse config file
    ParseFailed(toml::de::Error),
    /// Failed to serialize config
    SerializeFailed(toml::ser::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadFailed(e) => {
                write!(f, "Failed to read config file: {}", e)
            }
            ConfigError::WriteFailed(e) => {
                write!(f, "Failed to write config file: {}", e)
            }
            ConfigError::ParseFailed(e) => {
                write!(f, "Failed to parse config file: {}", e)
            }
            ConfigError::SerializeFailed(e) => {
                write!(f, "Failed to serialize config: {}", e)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadFailed(e) => Some(e),
            ConfigError::WriteFailed(e) => Some(e),
            ConfigError::ParseFailed(e) => Some(e),
            ConfigError::SerializeFailed(e) => Some(e),
        }
    }
}

/// Errors that can occur while polling the heart-rate server
#[derive(Debug)]
pub enum PollError {
    /// Request could not be sent or the body could not be read
    Request(reqwest::Error),
    /// Server answered with a non-success status
    Status(u16),
    /// Response body was not the expected JSON
    Decode(serde_json::Error),
}

impl fmt::Display for PollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollError::Request(e) => write!(f, "Request failed: {}", e),
            PollError::Status(code) => write!(f, "Server returned status {}", code),
            PollError::Decode(e) => write!(f, "Unexpected response body: {}", e),
        }
    }
}

impl std::error::Error for PollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PollError::Request(e) => Some(e),
            PollError::Status(_) => None,
            PollError::Decode(e) => Some(e),
        }
    }
}

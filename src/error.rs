//! Error types for Strix

use thiserror::Error;

/// Strix error type
#[derive(Error, Debug)]
pub enum StrixError {
    /// Invalid or inconsistent configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML for the schema
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The path optimizer produced no usable path
    #[error("Optimizer error: {0}")]
    Optimizer(String),

    /// More points than an inner segment can hold
    #[error("Segment overflow: {len} points exceed capacity {capacity}")]
    SegmentOverflow {
        /// Points offered
        len: usize,
        /// Slots available
        capacity: usize,
    },

    /// Outer waypoint or segment index past the end
    #[error("Index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of entries
        len: usize,
    },

    /// The trajectory has not been built yet
    #[error("Trajectory not initialized")]
    NotInitialized,
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, StrixError>;

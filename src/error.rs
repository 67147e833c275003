//! Error types for Stepflow operations.
//!
//! This module defines [`StepflowError`], the error type returned by the
//! engine's registry, run, and configuration operations, and a [`Result`]
//! type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Registration and reentrancy problems surface as `StepflowError`
//! - Step body failures never surface here; they are recorded in the
//!   step's [`StepResult`](crate::steps::StepResult)
//! - Use `anyhow::Error` (via `StepflowError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Stepflow operations.
#[derive(Debug, Error)]
pub enum StepflowError {
    /// A step with the same id is already registered.
    #[error("Step with id '{id}' already exists")]
    DuplicateStep { id: String },

    /// A reorder request was not a permutation of the registered ids.
    #[error("Invalid step order: {message}")]
    InvalidOrder { message: String },

    /// `run` was called while a run is already in progress.
    #[error("Workflow '{workflow}' is already running")]
    AlreadyRunning { workflow: String },

    /// A step id was referenced that is not registered.
    #[error("Unknown step: {id}")]
    UnknownStep { id: String },

    /// Workflow file not found at the expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse a workflow file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid workflow structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Stepflow operations.
pub type Result<T> = std::result::Result<T, StepflowError>;

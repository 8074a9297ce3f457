//! Error types for repository operations.
//!
//! This module defines the error types that can occur while building the asset
//! registry snapshot, including validation errors across configuration files
//! and loading errors.

use log::error;
use thiserror::Error;

/// Errors that can occur during repository operations
#[derive(Debug, Error)]
pub enum RepositoryError {
	/// Error that occurs when configuration validation fails
	#[error("Validation error: {0}")]
	ValidationError(String),

	/// Error that occurs when loading configurations from files
	#[error("Load error: {0}")]
	LoadError(String),

	/// Error that occurs due to internal repository operations
	#[error("Internal error: {0}")]
	InternalError(String),
}

impl RepositoryError {
	/// Create a new validation error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		error!("{}", error);
		error
	}

	/// Create a new load error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn load_error(msg: impl Into<String>) -> Self {
		let error = Self::LoadError(msg.into());
		error!("{}", error);
		error
	}

	/// Create a new internal error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn internal_error(msg: impl Into<String>) -> Self {
		let error = Self::InternalError(msg.into());
		error!("{}", error);
		error
	}
}

impl From<std::io::Error> for RepositoryError {
	fn from(err: std::io::Error) -> Self {
		Self::load_error(err.to_string())
	}
}

//! Configuration error types.
//!
//! Errors raised while reading asset registry files from disk. Parse errors
//! point at the offending file and position so a broken registry entry can be
//! found without re-running the loader.

use std::path::{Path, PathBuf};

use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
	/// A well-formed file describes an invalid registry entry
	#[error("Invalid asset configuration: {0}")]
	ValidationError(String),

	/// A file is not a JSON asset collection
	#[error("Malformed asset file {}:{line}:{column}: {message}", path.display())]
	ParseError {
		path: PathBuf,
		line: usize,
		column: usize,
		message: String,
	},

	/// The asset directory or a file in it cannot be read
	#[error("Cannot read asset configuration: {0}")]
	FileError(String),
}

impl ConfigError {
	/// Creates a validation error and logs it
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a parse error for `path` from a serde error and logs it
	pub fn parse_error(path: &Path, source: &serde_json::Error) -> Self {
		let error = Self::ParseError {
			path: path.to_path_buf(),
			line: source.line(),
			column: source.column(),
			message: source.to_string(),
		};
		error!("{}", error);
		error
	}

	/// Creates a file error and logs it
	pub fn file_error(msg: impl Into<String>) -> Self {
		let error = Self::FileError(msg.into());
		error!("{}", error);
		error
	}
}

impl From<std::io::Error> for ConfigError {
	fn from(err: std::io::Error) -> Self {
		Self::file_error(err.to_string())
	}
}

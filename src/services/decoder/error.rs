//! Decoder error types and handling.
//!
//! Per-log failures (`AssetResolution`, `MalformedLog`) leave the affected
//! event unclassified without stopping the rest of the transaction. The other
//! variant is raised while building the decoder registry.

use log::error;
use thiserror::Error;

/// Represents possible errors raised by decoders
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecoderError {
	/// An asset cannot be resolved to a known asset with a precision
	#[error("Asset resolution error: {0}")]
	AssetResolution(String),

	/// A log does not have the shape a decoder expects
	#[error("Malformed log: {0}")]
	MalformedLog(String),

	/// Two decoders claim the same counterparty tag
	#[error("Duplicate counterparty: {0}")]
	DuplicateCounterparty(String),
}

impl DecoderError {
	/// Creates a new asset resolution error with logging
	pub fn asset_resolution(msg: impl Into<String>) -> Self {
		let error = Self::AssetResolution(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new malformed log error with logging
	pub fn malformed_log(msg: impl Into<String>) -> Self {
		let error = Self::MalformedLog(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new duplicate counterparty error with logging
	pub fn duplicate_counterparty(counterparty: impl Into<String>) -> Self {
		let error = Self::DuplicateCounterparty(counterparty.into());
		error!("{}", error);
		error
	}
}

//! Enrichment pipeline error types and handling.
//!
//! These errors reject a whole transaction because its input violates the
//! association contract with the provisional event builder. Per-log decoding
//! failures are not errors at this level; they are reported in
//! `DecodedTransaction::failures`.

use log::error;
use thiserror::Error;

/// Represents possible errors raised while enriching one transaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
	/// Provisional events are not in strictly increasing sequence order
	#[error("Invalid event order: {0}")]
	InvalidEventOrder(String),

	/// An event or the bundle itself does not belong to the decoded transaction or chain
	#[error("Transaction mismatch: {0}")]
	TransactionMismatch(String),

	/// An event references a log index missing from the bundle
	#[error("Unknown log reference: {0}")]
	UnknownLogReference(String),

	/// Two receipt logs share one log index
	#[error("Duplicate log index: {0}")]
	DuplicateLogIndex(String),

	/// The worker decoding the transaction did not complete
	#[error("Task failure: {0}")]
	TaskFailure(String),
}

impl EnrichmentError {
	/// Creates a new invalid event order error with logging
	pub fn invalid_event_order(msg: impl Into<String>) -> Self {
		let error = Self::InvalidEventOrder(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new transaction mismatch error with logging
	pub fn transaction_mismatch(msg: impl Into<String>) -> Self {
		let error = Self::TransactionMismatch(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new unknown log reference error with logging
	pub fn unknown_log_reference(msg: impl Into<String>) -> Self {
		let error = Self::UnknownLogReference(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new duplicate log index error with logging
	pub fn duplicate_log_index(msg: impl Into<String>) -> Self {
		let error = Self::DuplicateLogIndex(msg.into());
		error!("{}", error);
		error
	}

	/// Creates a new task failure error with logging
	pub fn task_failure(msg: impl Into<String>) -> Self {
		let error = Self::TaskFailure(msg.into());
		error!("{}", error);
		error
	}
}

//! EVM receipt log data structures.

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};

/// A single log entry from a transaction receipt
///
/// Topics are kept as raw byte strings so that malformed input (a topic that is
/// not exactly 32 bytes) reaches the decoders and can be rejected there instead
/// of failing deserialization of the whole transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLog {
	/// Position of the log within the transaction's block
	pub log_index: u64,

	/// Contract that emitted the log
	pub address: Address,

	/// topic[0] is the event signature, the rest are indexed arguments
	#[serde(default)]
	pub topics: Vec<Bytes>,

	/// ABI-encoded non-indexed arguments
	#[serde(default)]
	pub data: Bytes,
}

impl ReceiptLog {
	/// Get the raw topic at `index`, if present
	pub fn topic(&self, index: usize) -> Option<&Bytes> {
		self.topics.get(index)
	}

	/// Get the event signature topic, if present
	pub fn signature(&self) -> Option<&Bytes> {
		self.topic(0)
	}
}

//! EVM transaction data structures.

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

/// A transaction as seen by the enrichment pipeline
///
/// Only the fields decoders reason about are kept: the hash that ties events to
/// the transaction, the chain it lives on, and the origin/destination accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
	/// Transaction hash
	pub hash: B256,

	/// EIP-155 chain identifier
	pub chain_id: u64,

	/// Account that signed the transaction
	pub from: Address,

	/// Destination account (None for contract creation)
	#[serde(default)]
	pub to: Option<Address>,
}

impl Transaction {
	/// Get the transaction hash
	pub fn hash(&self) -> &B256 {
		&self.hash
	}

	/// Get the transaction sender address
	pub fn sender(&self) -> &Address {
		&self.from
	}

	/// Get the transaction recipient address (None for contract creation)
	pub fn to(&self) -> Option<&Address> {
		self.to.as_ref()
	}
}

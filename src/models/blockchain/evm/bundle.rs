//! Input unit of the enrichment pipeline.

use std::collections::HashSet;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::models::{EVMReceiptLog, EVMTransaction, HistoryEvent};

/// A transaction, its receipt logs, and the provisional events built for it
///
/// Events reference their originating log through `HistoryEvent::log_index`.
/// Several events may share one log, and events synthesized without a log
/// (gas fees, internal native transfers) carry no reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionBundle {
	pub transaction: EVMTransaction,

	#[serde(default)]
	pub logs: Vec<EVMReceiptLog>,

	/// Provisional events in ascending sequence order
	#[serde(default)]
	pub events: Vec<HistoryEvent>,

	/// Locally tracked accounts
	#[serde(default)]
	pub tracked_accounts: HashSet<Address>,
}

impl TransactionBundle {
	pub fn new(transaction: EVMTransaction) -> Self {
		Self {
			transaction,
			logs: Vec::new(),
			events: Vec::new(),
			tracked_accounts: HashSet::new(),
		}
	}

	/// Whether `address` is one of the locally tracked accounts
	pub fn is_tracked(&self, address: &Address) -> bool {
		self.tracked_accounts.contains(address)
	}
}

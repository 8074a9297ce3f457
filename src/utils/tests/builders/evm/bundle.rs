use alloy::primitives::Address;

use crate::models::{EVMReceiptLog, EVMTransaction, EVMTransactionBundle, HistoryEvent};

use super::transaction::TransactionBuilder;

/// A builder for creating pipeline input bundles.
///
/// Events are renumbered in insertion order and stamped with the transaction
/// hash, so tests only describe what differs.
#[derive(Debug)]
pub struct BundleBuilder {
	transaction: EVMTransaction,
	logs: Vec<EVMReceiptLog>,
	events: Vec<HistoryEvent>,
	tracked_accounts: Vec<Address>,
}

impl Default for BundleBuilder {
	fn default() -> Self {
		Self {
			transaction: TransactionBuilder::new().build(),
			logs: Vec::new(),
			events: Vec::new(),
			tracked_accounts: Vec::new(),
		}
	}
}

impl BundleBuilder {
	/// Creates a new BundleBuilder instance.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn transaction(mut self, transaction: EVMTransaction) -> Self {
		self.transaction = transaction;
		self
	}

	/// Adds a receipt log.
	pub fn log(mut self, log: EVMReceiptLog) -> Self {
		self.logs.push(log);
		self
	}

	/// Adds a provisional event with no backing log.
	pub fn event(mut self, event: HistoryEvent) -> Self {
		self.events.push(event);
		self
	}

	/// Adds a provisional event built from the log at `log_index`.
	pub fn event_for_log(mut self, log_index: u64, mut event: HistoryEvent) -> Self {
		event.log_index = Some(log_index);
		self.events.push(event);
		self
	}

	/// Marks an account as locally tracked.
	pub fn tracked(mut self, account: Address) -> Self {
		self.tracked_accounts.push(account);
		self
	}

	/// Builds the TransactionBundle instance.
	pub fn build(self) -> EVMTransactionBundle {
		let tx_hash = self.transaction.hash;
		let mut bundle = EVMTransactionBundle::new(self.transaction);
		bundle.logs = self.logs;
		bundle.events = self
			.events
			.into_iter()
			.enumerate()
			.map(|(index, mut event)| {
				event.tx_hash = tx_hash;
				event.sequence_index = index as u32;
				event
			})
			.collect();
		bundle.tracked_accounts = self.tracked_accounts.into_iter().collect();
		bundle
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::utils::tests::builders::evm::{event::EventBuilder, log::LogBuilder};
	use alloy::primitives::B256;

	#[test]
	fn test_builder_numbers_events() {
		let tx = TransactionBuilder::new().hash(B256::with_last_byte(5)).build();
		let bundle = BundleBuilder::new()
			.transaction(tx)
			.log(LogBuilder::new().log_index(3).build())
			.event(EventBuilder::new().fee().build())
			.event_for_log(3, EventBuilder::new().spend().build())
			.tracked(Address::with_last_byte(1))
			.build();

		assert_eq!(bundle.logs.len(), 1);
		assert_eq!(bundle.events[0].sequence_index, 0);
		assert_eq!(bundle.events[1].sequence_index, 1);
		assert_eq!(bundle.events[1].log_index, Some(3));
		assert!(bundle
			.events
			.iter()
			.all(|event| event.tx_hash == B256::with_last_byte(5)));
		assert!(bundle.is_tracked(&Address::with_last_byte(1)));
	}
}

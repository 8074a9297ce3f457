//! Forward hints passed between logs of one transaction.

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::models::{Classification, HistoryEvent, HistoryEventSubType, HistoryEventType};

/// A hint telling the pipeline how to classify a later event of the same transaction
///
/// The item matches the first later event with the given type, subtype and
/// asset. Amount, location label and counterparty address narrow the match
/// further when set. A matching event receives `to` and the item is consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
	pub from_event_type: HistoryEventType,
	pub from_event_subtype: HistoryEventSubType,
	pub asset: String,
	#[serde(default)]
	pub amount: Option<BigDecimal>,
	#[serde(default)]
	pub location_label: Option<Address>,
	#[serde(default)]
	pub address: Option<Address>,
	pub to: Classification,
}

impl ActionItem {
	pub fn new(
		from_event_type: HistoryEventType,
		from_event_subtype: HistoryEventSubType,
		asset: impl Into<String>,
		to: Classification,
	) -> Self {
		Self {
			from_event_type,
			from_event_subtype,
			asset: asset.into(),
			amount: None,
			location_label: None,
			address: None,
			to,
		}
	}

	pub fn amount(mut self, amount: BigDecimal) -> Self {
		self.amount = Some(amount);
		self
	}

	pub fn location_label(mut self, location_label: Address) -> Self {
		self.location_label = Some(location_label);
		self
	}

	pub fn address(mut self, address: Address) -> Self {
		self.address = Some(address);
		self
	}

	/// Whether `event` is the event this item describes
	pub fn matches(&self, event: &HistoryEvent) -> bool {
		event.event_type == self.from_event_type
			&& event.event_subtype == self.from_event_subtype
			&& event.asset == self.asset
			&& self.amount.as_ref().is_none_or(|amount| *amount == event.amount)
			&& self
				.location_label
				.is_none_or(|label| event.location_label == Some(label))
			&& self.address.is_none_or(|address| event.address == Some(address))
	}
}

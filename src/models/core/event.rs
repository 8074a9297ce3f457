//! History event data structures.
//!
//! A `HistoryEvent` is created by the provisional event builder with a generic
//! classification and is reclassified at most once by the enrichment pipeline.

use std::fmt;

use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Semantic type of a history event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventType {
	Spend,
	Receive,
	Deposit,
	Withdrawal,
	Transfer,
	Informational,
}

impl HistoryEventType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Spend => "spend",
			Self::Receive => "receive",
			Self::Deposit => "deposit",
			Self::Withdrawal => "withdrawal",
			Self::Transfer => "transfer",
			Self::Informational => "informational",
		}
	}
}

impl fmt::Display for HistoryEventType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// Semantic subtype of a history event, scoped within its type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryEventSubType {
	None,
	DepositAsset,
	ReceiveWrapped,
	ReturnWrapped,
	RemoveAsset,
	Donate,
	Approve,
	Fee,
}

impl HistoryEventSubType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::None => "none",
			Self::DepositAsset => "deposit asset",
			Self::ReceiveWrapped => "receive wrapped",
			Self::ReturnWrapped => "return wrapped",
			Self::RemoveAsset => "remove asset",
			Self::Donate => "donate",
			Self::Approve => "approve",
			Self::Fee => "fee",
		}
	}
}

impl fmt::Display for HistoryEventSubType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

/// An accounting event attributed to a locally tracked account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
	pub tx_hash: B256,

	/// Position among the events of the same transaction
	pub sequence_index: u32,

	/// Index of the receipt log this event was built from, if any
	#[serde(default)]
	pub log_index: Option<u64>,

	/// Milliseconds since the unix epoch
	#[serde(default)]
	pub timestamp: u64,

	pub event_type: HistoryEventType,

	pub event_subtype: HistoryEventSubType,

	/// Asset identifier
	pub asset: String,

	pub amount: BigDecimal,

	/// Tracked account the event is attributed to
	#[serde(default)]
	pub location_label: Option<Address>,

	/// Tag of the protocol that claimed the event
	#[serde(default)]
	pub counterparty: Option<String>,

	#[serde(default)]
	pub notes: Option<String>,

	#[serde(default)]
	pub extra_data: Option<Map<String, Value>>,

	/// On-chain address on the other side of the movement
	#[serde(default)]
	pub address: Option<Address>,
}

impl HistoryEvent {
	/// Whether the event still carries the provisional generic classification
	pub fn is_unclassified(&self) -> bool {
		self.event_subtype == HistoryEventSubType::None && self.counterparty.is_none()
	}

	/// Applies a final classification to the event.
	///
	/// Only the classification fields are touched: transaction reference,
	/// sequence index and amount never change. The asset only changes when the
	/// classification explicitly corrects it.
	pub fn apply(&mut self, classification: Classification) {
		self.event_type = classification.event_type;
		self.event_subtype = classification.event_subtype;
		if classification.counterparty.is_some() {
			self.counterparty = classification.counterparty;
		}
		if classification.notes.is_some() {
			self.notes = classification.notes;
		}
		if classification.extra_data.is_some() {
			self.extra_data = classification.extra_data;
		}
		if classification.address.is_some() {
			self.address = classification.address;
		}
		if let Some(asset) = classification.corrected_asset {
			self.asset = asset;
		}
	}
}

/// Replacement classification produced by a decoder rule or action item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
	pub event_type: HistoryEventType,
	pub event_subtype: HistoryEventSubType,
	#[serde(default)]
	pub counterparty: Option<String>,
	#[serde(default)]
	pub notes: Option<String>,
	#[serde(default)]
	pub extra_data: Option<Map<String, Value>>,
	#[serde(default)]
	pub address: Option<Address>,
	/// Set only when correcting a misattributed asset
	#[serde(default)]
	pub corrected_asset: Option<String>,
}

impl Classification {
	pub fn new(event_type: HistoryEventType, event_subtype: HistoryEventSubType) -> Self {
		Self {
			event_type,
			event_subtype,
			counterparty: None,
			notes: None,
			extra_data: None,
			address: None,
			corrected_asset: None,
		}
	}

	pub fn counterparty(mut self, counterparty: impl Into<String>) -> Self {
		self.counterparty = Some(counterparty.into());
		self
	}

	pub fn notes(mut self, notes: impl Into<String>) -> Self {
		self.notes = Some(notes.into());
		self
	}

	pub fn extra_data(mut self, extra_data: Map<String, Value>) -> Self {
		self.extra_data = Some(extra_data);
		self
	}

	pub fn address(mut self, address: Address) -> Self {
		self.address = Some(address);
		self
	}

	pub fn corrected_asset(mut self, asset: impl Into<String>) -> Self {
		self.corrected_asset = Some(asset.into());
		self
	}
}

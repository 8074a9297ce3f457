//! Rule contract shared by all decoders.
//!
//! A rule looks at an immutable view of the current event and its log and
//! returns an outcome. It never mutates the event itself: the pipeline applies
//! the first claiming outcome, which keeps each rule testable on its own.

use std::{collections::HashSet, fmt};

use alloy::primitives::Address;

use crate::{
	models::{ActionItem, Asset, Classification, EVMReceiptLog, EVMTransaction, HistoryEvent},
	repositories::AssetRegistryTrait,
	services::decoder::DecoderError,
};

/// Everything an enrichment rule may inspect for one (log, event) pair
pub struct RuleContext<'a> {
	pub transaction: &'a EVMTransaction,
	pub log: &'a EVMReceiptLog,
	pub event: &'a HistoryEvent,
	/// Action items produced earlier in this transaction and not yet consumed
	pub action_items: &'a [ActionItem],
	/// Every log of the transaction in on-chain order
	pub all_logs: &'a [EVMReceiptLog],
	pub tracked_accounts: &'a HashSet<Address>,
	pub assets: &'a dyn AssetRegistryTrait,
}

impl RuleContext<'_> {
	/// Resolves the event's asset through the registry
	///
	/// # Errors
	/// Returns `AssetResolution` if the registry does not know the asset
	pub fn resolve_event_asset(&self) -> Result<Asset, DecoderError> {
		self.assets.get_asset(&self.event.asset).ok_or_else(|| {
			DecoderError::asset_resolution(format!("unknown asset {}", self.event.asset))
		})
	}

	/// Whether `address` is the transaction origin or another tracked account
	pub fn is_tracked(&self, address: &Address) -> bool {
		*address == self.transaction.from || self.tracked_accounts.contains(address)
	}
}

/// Everything a hint rule may inspect for one log
pub struct HintContext<'a> {
	pub transaction: &'a EVMTransaction,
	pub log: &'a EVMReceiptLog,
	pub all_logs: &'a [EVMReceiptLog],
	pub tracked_accounts: &'a HashSet<Address>,
	pub assets: &'a dyn AssetRegistryTrait,
}

impl HintContext<'_> {
	/// Whether `address` is the transaction origin or another tracked account
	pub fn is_tracked(&self, address: &Address) -> bool {
		*address == self.transaction.from || self.tracked_accounts.contains(address)
	}
}

/// Result of running one enrichment rule against an event
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
	/// The rule does not recognize this (log, event) pair
	Unmatched,

	/// The rule claims the pair. Without a classification the event is left
	/// as it is, but no other rule will look at it.
	Claimed {
		classification: Option<Classification>,
		action_items: Vec<ActionItem>,
	},
}

impl RuleOutcome {
	/// Claims the pair without reclassifying the event
	pub fn claimed() -> Self {
		Self::Claimed {
			classification: None,
			action_items: Vec::new(),
		}
	}

	/// Claims the pair and reclassifies the event
	pub fn reclassified(classification: Classification) -> Self {
		Self::Claimed {
			classification: Some(classification),
			action_items: Vec::new(),
		}
	}

	/// Attaches action items for later events of the transaction
	pub fn with_action_items(self, items: Vec<ActionItem>) -> Self {
		match self {
			Self::Unmatched => Self::Unmatched,
			Self::Claimed {
				classification,
				mut action_items,
			} => {
				action_items.extend(items);
				Self::Claimed {
					classification,
					action_items,
				}
			}
		}
	}

	pub fn is_claimed(&self) -> bool {
		matches!(self, Self::Claimed { .. })
	}
}

type EnrichmentRuleFn<'a> =
	dyn Fn(&RuleContext<'_>) -> Result<RuleOutcome, DecoderError> + Send + Sync + 'a;

type HintRuleFn<'a> =
	dyn Fn(&HintContext<'_>) -> Result<Vec<ActionItem>, DecoderError> + Send + Sync + 'a;

/// A named rule that may claim and reclassify a provisional event
pub struct EnrichmentRule<'a> {
	name: &'static str,
	apply: Box<EnrichmentRuleFn<'a>>,
}

impl<'a> EnrichmentRule<'a> {
	pub fn new<F>(name: &'static str, apply: F) -> Self
	where
		F: Fn(&RuleContext<'_>) -> Result<RuleOutcome, DecoderError> + Send + Sync + 'a,
	{
		Self {
			name,
			apply: Box::new(apply),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn apply(&self, ctx: &RuleContext<'_>) -> Result<RuleOutcome, DecoderError> {
		(self.apply)(ctx)
	}
}

impl fmt::Debug for EnrichmentRule<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EnrichmentRule")
			.field("name", &self.name)
			.finish()
	}
}

/// A named rule that turns a log into action items for later events
pub struct HintRule<'a> {
	name: &'static str,
	apply: Box<HintRuleFn<'a>>,
}

impl<'a> HintRule<'a> {
	pub fn new<F>(name: &'static str, apply: F) -> Self
	where
		F: Fn(&HintContext<'_>) -> Result<Vec<ActionItem>, DecoderError> + Send + Sync + 'a,
	{
		Self {
			name,
			apply: Box::new(apply),
		}
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn apply(&self, ctx: &HintContext<'_>) -> Result<Vec<ActionItem>, DecoderError> {
		(self.apply)(ctx)
	}
}

impl fmt::Debug for HintRule<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("HintRule").field("name", &self.name).finish()
	}
}

//! Protocol decoders and their registry.
//!
//! A decoder claims the contract addresses of one protocol and exposes an
//! ordered list of rules that recognize and reclassify provisional events.
//! Decoders are registered explicitly in a `DecoderRegistry` at startup and are
//! read-only afterwards, so they can be shared by concurrent enrichment passes.

mod error;
mod registry;
mod rule;

pub mod helpers;
pub mod protocols;

use std::collections::HashSet;

use alloy::primitives::Address;

pub use error::DecoderError;
pub use registry::{build_registry, DecoderRegistry};
pub use rule::{EnrichmentRule, HintContext, HintRule, RuleContext, RuleOutcome};

/// Contract every protocol decoder implements
///
/// # Rules
/// Each enrichment rule must first check whether the log's participating
/// addresses intersect `matched_addresses()` and return `Unmatched` if not.
/// Only then may it look at the event's current classification.
///
/// # Example
///
/// ```rust,ignore
/// impl Decoder for MyDecoder {
///     fn decoder_name(&self) -> &'static str {
///         "my_protocol"
///     }
///
///     fn matched_addresses(&self) -> &HashSet<Address> {
///         &self.contracts
///     }
///
///     fn enrichment_rules(&self) -> Vec<EnrichmentRule<'_>> {
///         vec![EnrichmentRule::new("transfers", move |ctx| self.maybe_enrich(ctx))]
///     }
///
///     fn counterparty_tags(&self) -> Vec<&'static str> {
///         vec!["my protocol"]
///     }
/// }
/// ```
pub trait Decoder: Send + Sync {
	/// Unique, stable name of the decoder (used in logs)
	fn decoder_name(&self) -> &'static str;

	/// Contract addresses this decoder is responsible for
	///
	/// Captured once when the decoder is constructed.
	fn matched_addresses(&self) -> &HashSet<Address>;

	/// Enrichment rules in the order they should be tried
	fn enrichment_rules(&self) -> Vec<EnrichmentRule<'_>>;

	/// Rules run once per log to produce action items for later events
	fn hint_rules(&self) -> Vec<HintRule<'_>> {
		Vec::new()
	}

	/// Counterparty tags this decoder attaches to the events it classifies
	fn counterparty_tags(&self) -> Vec<&'static str>;
}

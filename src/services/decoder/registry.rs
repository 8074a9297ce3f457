//! Decoder registration system.
//!
//! The registry keeps decoders in registration order, which is also their
//! priority: for any event, the first decoder whose rule claims it wins.

use std::{collections::HashMap, sync::Arc};

use crate::{
	repositories::AssetRegistryTrait,
	services::decoder::{
		protocols::{DonationDecoder, VaultDecoder, VaultProtocol},
		Decoder, DecoderError,
	},
};

/// Registry of all decoders, built once at startup
#[derive(Default)]
pub struct DecoderRegistry {
	/// Decoders in priority order
	decoders: Vec<Arc<dyn Decoder>>,
	/// Counterparty tag -> position of the owning decoder
	counterparties: HashMap<&'static str, usize>,
}

impl DecoderRegistry {
	/// Create a new empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append a decoder with the lowest priority so far.
	///
	/// # Errors
	/// Returns `DuplicateCounterparty` if one of the decoder's counterparty
	/// tags is already owned by a registered decoder. The registry is left
	/// unchanged in that case.
	pub fn register<D: Decoder + 'static>(&mut self, decoder: D) -> Result<(), DecoderError> {
		let tags = decoder.counterparty_tags();

		for (idx, tag) in tags.iter().enumerate() {
			if self.counterparties.contains_key(tag) || tags[..idx].contains(tag) {
				return Err(DecoderError::duplicate_counterparty(*tag));
			}
		}

		let position = self.decoders.len();
		self.counterparties
			.extend(tags.into_iter().map(|tag| (tag, position)));
		self.decoders.push(Arc::new(decoder));
		Ok(())
	}

	/// Decoders in priority order
	pub fn decoders(&self) -> &[Arc<dyn Decoder>] {
		&self.decoders
	}

	/// The decoder that owns `counterparty`
	pub fn decoder_for_counterparty(&self, counterparty: &str) -> Option<Arc<dyn Decoder>> {
		self.counterparties
			.get(counterparty)
			.and_then(|&position| self.decoders.get(position))
			.cloned()
	}

	/// All registered counterparty tags, sorted
	pub fn counterparties(&self) -> Vec<&'static str> {
		let mut tags: Vec<_> = self.counterparties.keys().copied().collect();
		tags.sort_unstable();
		tags
	}

	/// Check if any decoders are registered.
	pub fn is_empty(&self) -> bool {
		self.decoders.is_empty()
	}

	/// Get count of registered decoders.
	pub fn len(&self) -> usize {
		self.decoders.len()
	}
}

/// Build the decoder registry with every shipped decoder for `chain_id`.
///
/// This is where decoders are registered. Registration order is priority order.
pub fn build_registry(
	assets: &dyn AssetRegistryTrait,
	chain_id: u64,
) -> Result<DecoderRegistry, DecoderError> {
	let mut registry = DecoderRegistry::new();

	registry.register(VaultDecoder::new(assets, chain_id, VaultProtocol::pickle()))?;
	registry.register(DonationDecoder::new(assets, chain_id))?;

	tracing::info!(
		chain_id,
		decoders = registry.len(),
		counterparties = registry.counterparties().len(),
		"Built decoder registry"
	);

	Ok(registry)
}

//! Enrichment pipeline implementation.
//!
//! One pass per transaction:
//! 1. validate the bundle and sort its logs by log index
//! 2. for each log, run every decoder's hint rules, then offer each event built
//!    from the log to the pending action items and to the enrichment rules
//! 3. offer events without a backing log to the remaining action items
//!
//! The pass owns the transaction's events and action items exclusively, so
//! independent transactions can be decoded concurrently with one shared
//! pipeline.

use std::{
	collections::{HashMap, HashSet},
	sync::Arc,
};

use alloy::primitives::B256;
use itertools::Itertools;
use tracing::instrument;

use crate::{
	models::{ActionItem, Classification, EVMTransactionBundle, HistoryEvent},
	repositories::AssetRegistryTrait,
	services::{
		decoder::{
			build_registry, DecoderError, DecoderRegistry, EnrichmentRule, HintContext, HintRule,
			RuleContext, RuleOutcome,
		},
		enrichment::EnrichmentError,
	},
};

/// A per-log decoding failure that left an event unclassified
#[derive(Debug, Clone, PartialEq)]
pub struct LogFailure {
	pub log_index: u64,
	/// Event being enriched, None when a hint rule failed
	pub sequence_index: Option<u32>,
	pub error: DecoderError,
}

/// Result of enriching one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedTransaction {
	pub transaction_hash: B256,
	/// Same length and order as the provisional events
	pub events: Vec<HistoryEvent>,
	pub failures: Vec<LogFailure>,
}

impl DecodedTransaction {
	/// Whether every log was decoded without error
	pub fn is_complete(&self) -> bool {
		self.failures.is_empty()
	}
}

/// A rule that claimed an event
struct Claim {
	decoder: &'static str,
	rule: &'static str,
	classification: Option<Classification>,
	action_items: Vec<ActionItem>,
}

/// Reclassifies provisional events using the registered decoders
pub struct EnrichmentPipeline {
	chain_id: u64,
	registry: Arc<DecoderRegistry>,
	assets: Arc<dyn AssetRegistryTrait>,
}

impl EnrichmentPipeline {
	/// Creates a pipeline decoding transactions of `chain_id`
	///
	/// The registry's decoders must have been built for the same chain.
	pub fn new(
		chain_id: u64,
		registry: Arc<DecoderRegistry>,
		assets: Arc<dyn AssetRegistryTrait>,
	) -> Self {
		Self {
			chain_id,
			registry,
			assets,
		}
	}

	/// Creates a pipeline with every shipped decoder for `chain_id`
	pub fn with_default_decoders(
		chain_id: u64,
		assets: Arc<dyn AssetRegistryTrait>,
	) -> Result<Self, DecoderError> {
		let registry = build_registry(assets.as_ref(), chain_id)?;
		Ok(Self::new(chain_id, Arc::new(registry), assets))
	}

	pub fn chain_id(&self) -> u64 {
		self.chain_id
	}

	pub fn registry(&self) -> &DecoderRegistry {
		&self.registry
	}

	/// Enriches the provisional events of one transaction.
	///
	/// # Errors
	/// Returns an `EnrichmentError` if the bundle violates the input contract.
	/// Decoding failures of individual logs are reported in
	/// [`DecodedTransaction::failures`] instead.
	#[instrument(skip_all, fields(tx_hash = %bundle.transaction.hash))]
	pub fn decode_transaction(
		&self,
		bundle: EVMTransactionBundle,
	) -> Result<DecodedTransaction, EnrichmentError> {
		self.validate(&bundle)?;

		let EVMTransactionBundle {
			transaction,
			mut logs,
			mut events,
			tracked_accounts,
		} = bundle;
		logs.sort_by_key(|log| log.log_index);

		let mut events_by_log: HashMap<u64, Vec<usize>> = HashMap::new();
		for (position, event) in events.iter().enumerate() {
			if let Some(log_index) = event.log_index {
				events_by_log.entry(log_index).or_default().push(position);
			}
		}

		let decoders = self.registry.decoders();
		let hint_rules: Vec<(&'static str, HintRule<'_>)> = decoders
			.iter()
			.flat_map(|decoder| {
				decoder
					.hint_rules()
					.into_iter()
					.map(move |rule| (decoder.decoder_name(), rule))
			})
			.collect();
		let enrichment_rules: Vec<(&'static str, EnrichmentRule<'_>)> = decoders
			.iter()
			.flat_map(|decoder| {
				decoder
					.enrichment_rules()
					.into_iter()
					.map(move |rule| (decoder.decoder_name(), rule))
			})
			.collect();

		let mut pending: Vec<ActionItem> = Vec::new();
		let mut failures = Vec::new();

		for log in &logs {
			let hint_ctx = HintContext {
				transaction: &transaction,
				log,
				all_logs: &logs,
				tracked_accounts: &tracked_accounts,
				assets: self.assets.as_ref(),
			};
			for (decoder, rule) in &hint_rules {
				match rule.apply(&hint_ctx) {
					Ok(items) => pending.extend(items),
					Err(error) => {
						tracing::warn!(
							log_index = log.log_index,
							decoder,
							rule = rule.name(),
							%error,
							"Hint rule failed"
						);
						failures.push(LogFailure {
							log_index: log.log_index,
							sequence_index: None,
							error,
						});
					}
				}
			}

			let Some(positions) = events_by_log.get(&log.log_index) else {
				continue;
			};

			for &position in positions {
				if consume_action_item(&mut pending, &mut events[position]) {
					continue;
				}

				let event = &events[position];
				let ctx = RuleContext {
					transaction: &transaction,
					log,
					event,
					action_items: &pending,
					all_logs: &logs,
					tracked_accounts: &tracked_accounts,
					assets: self.assets.as_ref(),
				};

				match first_claim(&enrichment_rules, &ctx) {
					Ok(Some(claim)) => {
						tracing::debug!(
							log_index = log.log_index,
							sequence_index = event.sequence_index,
							decoder = claim.decoder,
							rule = claim.rule,
							reclassified = claim.classification.is_some(),
							"Event claimed"
						);
						if let Some(classification) = claim.classification {
							events[position].apply(classification);
						}
						pending.extend(claim.action_items);
					}
					Ok(None) => {}
					Err(error) => {
						tracing::warn!(
							log_index = log.log_index,
							sequence_index = event.sequence_index,
							%error,
							"Failed to decode log"
						);
						failures.push(LogFailure {
							log_index: log.log_index,
							sequence_index: Some(event.sequence_index),
							error,
						});
					}
				}
			}
		}

		for event in events.iter_mut().filter(|event| event.log_index.is_none()) {
			consume_action_item(&mut pending, event);
		}

		if !pending.is_empty() {
			tracing::debug!(count = pending.len(), "Dropping unconsumed action items");
		}

		Ok(DecodedTransaction {
			transaction_hash: transaction.hash,
			events,
			failures,
		})
	}

	/// Enriches independent transactions concurrently.
	///
	/// Each transaction is decoded on a blocking task sharing this pipeline.
	/// Results are returned in input order and a failed transaction never
	/// affects the others.
	pub async fn decode_transactions(
		self: Arc<Self>,
		bundles: Vec<EVMTransactionBundle>,
	) -> Vec<Result<DecodedTransaction, EnrichmentError>> {
		tracing::debug!(transactions = bundles.len(), "Decoding transaction batch");

		let (hashes, handles): (Vec<_>, Vec<_>) = bundles
			.into_iter()
			.map(|bundle| {
				let pipeline = Arc::clone(&self);
				let tx_hash = bundle.transaction.hash;
				let handle =
					tokio::task::spawn_blocking(move || pipeline.decode_transaction(bundle));
				(tx_hash, handle)
			})
			.unzip();

		futures::future::join_all(handles)
			.await
			.into_iter()
			.zip(hashes)
			.map(|(joined, tx_hash)| {
				joined.unwrap_or_else(|e| {
					Err(EnrichmentError::task_failure(format!(
						"decoding of transaction {} did not complete: {}",
						tx_hash, e
					)))
				})
			})
			.collect()
	}

	fn validate(&self, bundle: &EVMTransactionBundle) -> Result<(), EnrichmentError> {
		let transaction = &bundle.transaction;

		if transaction.chain_id != self.chain_id {
			return Err(EnrichmentError::transaction_mismatch(format!(
				"transaction {} is on chain {}, pipeline decodes chain {}",
				transaction.hash, transaction.chain_id, self.chain_id
			)));
		}

		if let Some(event) = bundle
			.events
			.iter()
			.find(|event| event.tx_hash != transaction.hash)
		{
			return Err(EnrichmentError::transaction_mismatch(format!(
				"event {} belongs to transaction {}, not {}",
				event.sequence_index, event.tx_hash, transaction.hash
			)));
		}

		if let Some((previous, next)) = bundle
			.events
			.iter()
			.map(|event| event.sequence_index)
			.tuple_windows()
			.find(|(previous, next)| previous >= next)
		{
			return Err(EnrichmentError::invalid_event_order(format!(
				"sequence index {} follows {} in transaction {}",
				next, previous, transaction.hash
			)));
		}

		let mut log_indices = HashSet::with_capacity(bundle.logs.len());
		if let Some(log) = bundle
			.logs
			.iter()
			.find(|log| !log_indices.insert(log.log_index))
		{
			return Err(EnrichmentError::duplicate_log_index(format!(
				"log index {} appears more than once in transaction {}",
				log.log_index, transaction.hash
			)));
		}

		if let Some((event, log_index)) = bundle.events.iter().find_map(|event| {
			event
				.log_index
				.filter(|log_index| !log_indices.contains(log_index))
				.map(|log_index| (event, log_index))
		}) {
			return Err(EnrichmentError::unknown_log_reference(format!(
				"event {} references log {} missing from transaction {}",
				event.sequence_index, log_index, transaction.hash
			)));
		}

		Ok(())
	}
}

/// Applies and removes the oldest pending action item matching `event`
fn consume_action_item(pending: &mut Vec<ActionItem>, event: &mut HistoryEvent) -> bool {
	let Some(position) = pending.iter().position(|item| item.matches(event)) else {
		return false;
	};
	let item = pending.remove(position);
	tracing::debug!(
		sequence_index = event.sequence_index,
		asset = %item.asset,
		"Applied action item"
	);
	event.apply(item.to);
	true
}

/// Runs rules in priority order until one claims the event
fn first_claim(
	rules: &[(&'static str, EnrichmentRule<'_>)],
	ctx: &RuleContext<'_>,
) -> Result<Option<Claim>, DecoderError> {
	for (decoder, rule) in rules {
		match rule.apply(ctx)? {
			RuleOutcome::Unmatched => continue,
			RuleOutcome::Claimed {
				classification,
				action_items,
			} => {
				return Ok(Some(Claim {
					decoder: *decoder,
					rule: rule.name(),
					classification,
					action_items,
				}))
			}
		}
	}
	Ok(None)
}

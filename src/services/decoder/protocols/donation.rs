//! Decoder for Gitcoin grant rounds.
//!
//! Donations are announced by a log of the round or of its voting strategy:
//! `Voted` (with or without an application index) for grants stack rounds and
//! `Allocated` for Allo v2 strategies. A token donation also has its own ERC20
//! `Transfer`, which may come before or after the announcement, so it is
//! reclassified by looking the announcement up among the transaction's logs.
//! A native donation has no log of its own and is reached through an action
//! item. Matching payouts are plain token transfers out of a round contract.

use std::collections::HashSet;

use alloy::primitives::{address, keccak256, Address, B256, U256};
use bigdecimal::BigDecimal;
use serde_json::{Map, Value};

use crate::{
	models::{
		ActionItem, Asset, Classification, EVMReceiptLog, HistoryEventSubType, HistoryEventType,
	},
	repositories::AssetRegistryTrait,
	services::decoder::{
		helpers::evm::{
			address_from_data, amount_from_data, b256_to_string, format_amount, normalize_amount,
			topic_address, topic_word, ERC20_TRANSFER_TOPIC,
		},
		Decoder, DecoderError, EnrichmentRule, HintContext, HintRule, RuleContext, RuleOutcome,
	},
};

/// Registry protocol tag of Gitcoin round and strategy contracts
pub const GITCOIN_ROUND_PROTOCOL: &str = "gitcoin_round";

/// Counterparty tag of Gitcoin
pub const CPT_GITCOIN: &str = "gitcoin";

const VOTED_EVENT: &str = "Voted(address,uint256,address,address,bytes32,uint256,address)";
const LEGACY_VOTED_EVENT: &str = "Voted(address,uint256,address,address,bytes32,address)";
const ALLOCATED_EVENT: &str = "Allocated(address,uint256,address,address)";

/// Token address Allo v2 uses for the native coin
const ALLO_NATIVE_TOKEN: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

/// A donation announced by a round or strategy log
#[derive(Debug, Clone, PartialEq)]
struct Donation {
	donor: Address,
	grant: Address,
	token: Address,
	raw_amount: U256,
	extra_data: Map<String, Value>,
}

impl Donation {
	fn is_native(&self) -> bool {
		self.token == Address::ZERO || self.token == ALLO_NATIVE_TOKEN
	}
}

pub struct DonationDecoder {
	chain_id: u64,
	rounds: HashSet<Address>,
	voted_topic: B256,
	legacy_voted_topic: B256,
	allocated_topic: B256,
}

impl DonationDecoder {
	pub fn new(assets: &dyn AssetRegistryTrait, chain_id: u64) -> Self {
		let rounds = assets.get_addresses_by_protocol(chain_id, GITCOIN_ROUND_PROTOCOL);
		tracing::debug!(rounds = rounds.len(), "Initialized gitcoin decoder");
		Self {
			chain_id,
			rounds,
			voted_topic: keccak256(VOTED_EVENT),
			legacy_voted_topic: keccak256(LEGACY_VOTED_EVENT),
			allocated_topic: keccak256(ALLOCATED_EVENT),
		}
	}

	fn is_round(&self, address: Option<Address>) -> bool {
		address.is_some_and(|address| self.rounds.contains(&address))
	}

	/// Reads the donation a log announces, if it is a `Voted` or `Allocated`
	/// log of a known round.
	fn parse_donation(&self, log: &EVMReceiptLog) -> Result<Option<Donation>, DecoderError> {
		let Some(signature) = log.signature() else {
			return Ok(None);
		};
		let signature: &[u8] = signature.as_ref();

		if signature == self.allocated_topic.as_slice() {
			if !self.rounds.contains(&log.address) {
				return Ok(None);
			}
			let Some(recipient) = topic_address(log, 1)? else {
				return Ok(None);
			};
			return Ok(Some(Donation {
				donor: address_from_data(&log.data, 2)?,
				grant: recipient,
				token: address_from_data(&log.data, 1)?,
				raw_amount: amount_from_data(&log.data, 0)?,
				extra_data: Map::new(),
			}));
		}

		let with_application_index = signature == self.voted_topic.as_slice();
		if !with_application_index && signature != self.legacy_voted_topic.as_slice() {
			return Ok(None);
		}
		let round = topic_address(log, 3).ok().flatten();
		if !(self.rounds.contains(&log.address) || self.is_round(round)) {
			return Ok(None);
		}
		let Some(voter) = topic_address(log, 1)? else {
			return Ok(None);
		};

		let mut extra_data = Map::new();
		if let Some(project_id) = topic_word(log, 2)? {
			extra_data.insert(
				"project_id".to_string(),
				Value::String(b256_to_string(project_id)),
			);
		}
		if with_application_index {
			extra_data.insert(
				"application_index".to_string(),
				Value::String(amount_from_data(&log.data, 3)?.to_string()),
			);
		}

		Ok(Some(Donation {
			donor: voter,
			grant: address_from_data(&log.data, 2)?,
			token: address_from_data(&log.data, 0)?,
			raw_amount: amount_from_data(&log.data, 1)?,
			extra_data,
		}))
	}

	/// The asset a donation is made in
	fn donation_asset(
		&self,
		assets: &dyn AssetRegistryTrait,
		donation: &Donation,
	) -> Result<Asset, DecoderError> {
		let asset = if donation.is_native() {
			assets.get_native_asset(self.chain_id)
		} else {
			assets.get_asset(&Asset::evm_token_identifier(self.chain_id, &donation.token))
		};
		asset.ok_or_else(|| {
			DecoderError::asset_resolution(format!(
				"unknown donation token {} on chain {}",
				donation.token, self.chain_id
			))
		})
	}

	/// Classification of the donor side. Donating to a tracked grant is a transfer.
	fn outgoing_classification(
		donation: &Donation,
		asset: &Asset,
		amount: &BigDecimal,
		grant_tracked: bool,
	) -> Classification {
		let (event_type, verb) = if grant_tracked {
			(HistoryEventType::Transfer, "Transfer")
		} else {
			(HistoryEventType::Spend, "Make")
		};
		with_extra_data(
			Classification::new(event_type, HistoryEventSubType::Donate)
				.counterparty(CPT_GITCOIN)
				.notes(format!(
					"{} a gitcoin donation of {} {} to {}",
					verb,
					format_amount(amount),
					asset.symbol,
					donation.grant
				))
				.address(donation.grant),
			&donation.extra_data,
		)
	}

	fn incoming_classification(
		donation: &Donation,
		asset: &Asset,
		amount: &BigDecimal,
	) -> Classification {
		with_extra_data(
			Classification::new(HistoryEventType::Receive, HistoryEventSubType::Donate)
				.counterparty(CPT_GITCOIN)
				.notes(format!(
					"Receive a gitcoin donation of {} {} from {}",
					format_amount(amount),
					asset.symbol,
					donation.donor
				))
				.address(donation.donor),
			&donation.extra_data,
		)
	}

	/// Turns an announced native donation into an action item for its value
	/// transfer, which has no log.
	///
	/// Token donations are matched against their own `Transfer` log instead.
	/// Votes between two untracked accounts produce nothing.
	fn maybe_hint_donation(&self, ctx: &HintContext<'_>) -> Result<Vec<ActionItem>, DecoderError> {
		let Some(donation) = self.parse_donation(ctx.log)? else {
			return Ok(Vec::new());
		};
		let asset = self.donation_asset(ctx.assets, &donation)?;
		if !donation.is_native() {
			return Ok(Vec::new());
		}
		let amount = normalize_amount(donation.raw_amount, &asset)?;

		let item = if donation.donor == ctx.transaction.from {
			let to = Self::outgoing_classification(
				&donation,
				&asset,
				&amount,
				ctx.is_tracked(&donation.grant),
			);
			ActionItem::new(
				HistoryEventType::Spend,
				HistoryEventSubType::None,
				asset.identifier,
				to,
			)
			.amount(amount)
			.location_label(donation.donor)
		} else if ctx.is_tracked(&donation.grant) {
			let to = Self::incoming_classification(&donation, &asset, &amount);
			ActionItem::new(
				HistoryEventType::Receive,
				HistoryEventSubType::None,
				asset.identifier,
				to,
			)
			.amount(amount)
			.location_label(donation.grant)
		} else {
			return Ok(Vec::new());
		};

		tracing::debug!(
			log_index = ctx.log.log_index,
			donor = %donation.donor,
			grant = %donation.grant,
			"Queued gitcoin donation"
		);
		Ok(vec![item])
	}

	/// Reclassifies an ERC20 transfer from a donor to a grant that a round log
	/// of the same transaction announces as a donation.
	fn maybe_enrich_token_donation(
		&self,
		ctx: &RuleContext<'_>,
	) -> Result<RuleOutcome, DecoderError> {
		let log = ctx.log;
		if log.signature().map(|topic| topic.as_ref()) != Some(ERC20_TRANSFER_TOPIC.as_slice()) {
			return Ok(RuleOutcome::Unmatched);
		}
		// Malformed round logs are reported by the hint rule for their own log
		let announced: Vec<Donation> = ctx
			.all_logs
			.iter()
			.filter_map(|other| self.parse_donation(other).ok().flatten())
			.filter(|donation| donation.token == log.address)
			.collect();
		if announced.is_empty() {
			return Ok(RuleOutcome::Unmatched);
		}

		let (Some(from), Some(to)) = (topic_address(log, 1)?, topic_address(log, 2)?) else {
			return Ok(RuleOutcome::Unmatched);
		};
		let raw_amount = amount_from_data(&log.data, 0)?;
		let Some(donation) = announced.into_iter().find(|donation| {
			donation.donor == from && donation.grant == to && donation.raw_amount == raw_amount
		}) else {
			return Ok(RuleOutcome::Unmatched);
		};

		let event = ctx.event;
		let outgoing = from == ctx.transaction.from;
		let expected_label = if outgoing { from } else { to };
		let expected_type = if outgoing {
			HistoryEventType::Spend
		} else {
			HistoryEventType::Receive
		};
		if event.event_type != expected_type
			|| event.event_subtype != HistoryEventSubType::None
			|| event.location_label != Some(expected_label)
			|| event.asset != Asset::evm_token_identifier(ctx.transaction.chain_id, &log.address)
		{
			return Ok(RuleOutcome::Unmatched);
		}
		if !outgoing && !ctx.is_tracked(&to) {
			return Ok(RuleOutcome::Unmatched);
		}

		let asset = ctx.resolve_event_asset()?;
		let amount = normalize_amount(raw_amount, &asset)?;
		if amount != event.amount {
			return Ok(RuleOutcome::Unmatched);
		}

		let classification = if outgoing {
			Self::outgoing_classification(&donation, &asset, &amount, ctx.is_tracked(&to))
		} else {
			Self::incoming_classification(&donation, &asset, &amount)
		};
		Ok(RuleOutcome::reclassified(classification))
	}

	/// Reclassifies a token transfer from a round contract to the receiving account.
	fn maybe_enrich_matching_payout(
		&self,
		ctx: &RuleContext<'_>,
	) -> Result<RuleOutcome, DecoderError> {
		let log = ctx.log;
		let sender = topic_address(log, 1).ok().flatten();
		if !self.is_round(sender) {
			return Ok(RuleOutcome::Unmatched);
		}
		if log.signature().map(|topic| topic.as_ref()) != Some(ERC20_TRANSFER_TOPIC.as_slice()) {
			return Ok(RuleOutcome::Unmatched);
		}

		let event = ctx.event;
		let receiver = topic_address(log, 2)?;
		if event.event_type != HistoryEventType::Receive
			|| event.event_subtype != HistoryEventSubType::None
			|| receiver.is_none()
			|| receiver != event.location_label
			|| event.asset != Asset::evm_token_identifier(ctx.transaction.chain_id, &log.address)
		{
			return Ok(RuleOutcome::Unmatched);
		}

		let asset = ctx.resolve_event_asset()?;
		if normalize_amount(amount_from_data(&log.data, 0)?, &asset)? != event.amount {
			return Ok(RuleOutcome::Unmatched);
		}

		let classification =
			Classification::new(HistoryEventType::Receive, HistoryEventSubType::Donate)
				.counterparty(CPT_GITCOIN)
				.notes(format!(
					"Receive matching payout of {} {} for a gitcoin round",
					format_amount(&event.amount),
					asset.symbol
				))
				.address(sender.unwrap_or(log.address));
		Ok(RuleOutcome::reclassified(classification))
	}
}

fn with_extra_data(classification: Classification, extra_data: &Map<String, Value>) -> Classification {
	if extra_data.is_empty() {
		classification
	} else {
		classification.extra_data(extra_data.clone())
	}
}

impl Decoder for DonationDecoder {
	fn decoder_name(&self) -> &'static str {
		GITCOIN_ROUND_PROTOCOL
	}

	fn matched_addresses(&self) -> &HashSet<Address> {
		&self.rounds
	}

	fn enrichment_rules(&self) -> Vec<EnrichmentRule<'_>> {
		vec![
			EnrichmentRule::new("matching_payout", move |ctx| {
				self.maybe_enrich_matching_payout(ctx)
			}),
			EnrichmentRule::new("token_donation", move |ctx| {
				self.maybe_enrich_token_donation(ctx)
			}),
		]
	}

	fn hint_rules(&self) -> Vec<HintRule<'_>> {
		vec![HintRule::new("announced_donation", move |ctx| {
			self.maybe_hint_donation(ctx)
		})]
	}

	fn counterparty_tags(&self) -> Vec<&'static str> {
		vec![CPT_GITCOIN]
	}
}

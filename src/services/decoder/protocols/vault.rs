//! Decoder for vault/jar protocols.
//!
//! A vault takes an underlying token and mints a wrapped share token whose
//! contract is the vault itself. Deposits and withdrawals therefore show up as
//! plain ERC20 transfers, which this decoder recognizes from the vault
//! addresses involved:
//!
//! | provisional  | condition                                   | final                     |
//! |--------------|---------------------------------------------|---------------------------|
//! | SPEND/NONE   | origin sends underlying to a vault          | DEPOSIT/DEPOSIT_ASSET     |
//! | RECEIVE/NONE | log emitted by a vault (share token minted) | RECEIVE/RECEIVE_WRAPPED   |
//! | SPEND/NONE   | origin burns shares (sent to zero address)  | SPEND/RETURN_WRAPPED      |
//! | RECEIVE/NONE | vault sends underlying to the origin        | WITHDRAWAL/REMOVE_ASSET   |

use std::collections::HashSet;

use alloy::primitives::Address;

use crate::{
	models::{Asset, Classification, HistoryEventSubType, HistoryEventType},
	repositories::AssetRegistryTrait,
	services::decoder::{
		helpers::evm::{amount_from_data, format_amount, normalize_amount, topic_address},
		Decoder, DecoderError, EnrichmentRule, RuleContext, RuleOutcome,
	},
};

/// Registry protocol tag of Pickle Finance jars
pub const PICKLE_JAR_PROTOCOL: &str = "pickle_jar";

/// Counterparty tag of Pickle Finance
pub const CPT_PICKLE: &str = "pickle finance";

/// Identity of one vault protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VaultProtocol {
	/// Registry tag of the vault contracts
	pub protocol: &'static str,
	/// Counterparty attached to classified events
	pub counterparty: &'static str,
	/// Name used in event notes
	pub label: &'static str,
}

impl VaultProtocol {
	pub const fn pickle() -> Self {
		Self {
			protocol: PICKLE_JAR_PROTOCOL,
			counterparty: CPT_PICKLE,
			label: "pickle",
		}
	}
}

/// The four vault flows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VaultFlow {
	Deposit,
	ReceiveWrapped,
	ReturnWrapped,
	Withdraw,
}

pub struct VaultDecoder {
	protocol: VaultProtocol,
	vaults: HashSet<Address>,
}

impl VaultDecoder {
	/// Creates the decoder, capturing the protocol's vault addresses from the registry
	pub fn new(assets: &dyn AssetRegistryTrait, chain_id: u64, protocol: VaultProtocol) -> Self {
		let vaults = assets.get_addresses_by_protocol(chain_id, protocol.protocol);
		tracing::debug!(
			protocol = protocol.protocol,
			vaults = vaults.len(),
			"Initialized vault decoder"
		);
		Self { protocol, vaults }
	}

	fn is_vault(&self, address: Option<Address>) -> bool {
		address.is_some_and(|address| self.vaults.contains(&address))
	}

	/// Whether the event's asset is what `vault` wraps. A vault share token
	/// without a declared underlying accepts any asset.
	fn wraps(&self, ctx: &RuleContext<'_>, vault: Address) -> bool {
		ctx.assets
			.get_asset(&Asset::evm_token_identifier(ctx.transaction.chain_id, &vault))
			.and_then(|share| share.underlying)
			.is_none_or(|underlying| underlying == ctx.event.asset)
	}

	/// Enriches transfers to and from vault contracts.
	///
	/// # Errors
	/// - `MalformedLog` if a topic is not 32 bytes or the data holds no amount
	/// - `AssetResolution` if the event's asset or its precision is unknown
	fn maybe_enrich_vault_transfers(
		&self,
		ctx: &RuleContext<'_>,
	) -> Result<RuleOutcome, DecoderError> {
		let log = ctx.log;
		// A topic that does not decode cannot name a vault
		let involves_vault = self.vaults.contains(&log.address)
			|| [1, 2]
				.into_iter()
				.any(|index| self.is_vault(topic_address(log, index).ok().flatten()));
		if !involves_vault {
			return Ok(RuleOutcome::Unmatched);
		}
		let sender = topic_address(log, 1)?;
		let receiver = topic_address(log, 2)?;

		let event = ctx.event;
		let origin = ctx.transaction.from;
		let acted_by_origin = event.location_label == Some(origin);

		let flow = match (event.event_type, event.event_subtype) {
			(HistoryEventType::Spend, HistoryEventSubType::None)
				if acted_by_origin && self.is_vault(receiver) =>
			{
				VaultFlow::Deposit
			}
			(HistoryEventType::Receive, HistoryEventSubType::None)
				if self.vaults.contains(&log.address) =>
			{
				VaultFlow::ReceiveWrapped
			}
			(HistoryEventType::Spend, HistoryEventSubType::None)
				if acted_by_origin
					&& receiver == Some(Address::ZERO)
					&& sender == Some(origin) =>
			{
				VaultFlow::ReturnWrapped
			}
			(HistoryEventType::Receive, HistoryEventSubType::None)
				if acted_by_origin && receiver == Some(origin) && self.is_vault(sender) =>
			{
				VaultFlow::Withdraw
			}
			_ => return Ok(RuleOutcome::Unmatched),
		};

		// The wrapped token is the vault itself, so only the other flows need the
		// emitting contract to be the event's token.
		if flow != VaultFlow::ReceiveWrapped
			&& event.asset != Asset::evm_token_identifier(ctx.transaction.chain_id, &log.address)
		{
			return Ok(RuleOutcome::claimed());
		}
		let vault = match flow {
			VaultFlow::Deposit => receiver,
			VaultFlow::Withdraw => sender,
			VaultFlow::ReceiveWrapped | VaultFlow::ReturnWrapped => None,
		};
		if let Some(vault) = vault {
			if !self.wraps(ctx, vault) {
				return Ok(RuleOutcome::claimed());
			}
		}

		let asset = ctx.resolve_event_asset()?;
		let amount = normalize_amount(amount_from_data(&log.data, 0)?, &asset)?;
		if amount != event.amount {
			return Ok(RuleOutcome::Unmatched);
		}

		let amount = format_amount(&event.amount);
		let label = self.protocol.label;
		let classification = match flow {
			VaultFlow::Deposit => Classification::new(
				HistoryEventType::Deposit,
				HistoryEventSubType::DepositAsset,
			)
			.notes(format!(
				"Deposit {} {} in {} contract",
				amount, asset.symbol, label
			))
			.address(receiver.unwrap_or(log.address)),
			VaultFlow::ReceiveWrapped => Classification::new(
				HistoryEventType::Receive,
				HistoryEventSubType::ReceiveWrapped,
			)
			.notes(format!(
				"Receive {} {} after depositing in {} contract",
				amount, asset.symbol, label
			))
			.address(log.address),
			VaultFlow::ReturnWrapped => Classification::new(
				HistoryEventType::Spend,
				HistoryEventSubType::ReturnWrapped,
			)
			.notes(format!(
				"Return {} {} to the {} contract",
				amount, asset.symbol, label
			))
			.address(log.address),
			VaultFlow::Withdraw => Classification::new(
				HistoryEventType::Withdrawal,
				HistoryEventSubType::RemoveAsset,
			)
			.notes(format!(
				"Unstake {} {} from the {} contract",
				amount, asset.symbol, label
			))
			.address(sender.unwrap_or(log.address)),
		};

		Ok(RuleOutcome::reclassified(
			classification.counterparty(self.protocol.counterparty),
		))
	}
}

impl Decoder for VaultDecoder {
	fn decoder_name(&self) -> &'static str {
		self.protocol.protocol
	}

	fn matched_addresses(&self) -> &HashSet<Address> {
		&self.vaults
	}

	fn enrichment_rules(&self) -> Vec<EnrichmentRule<'_>> {
		vec![EnrichmentRule::new("vault_transfers", move |ctx| {
			self.maybe_enrich_vault_transfers(ctx)
		})]
	}

	fn counterparty_tags(&self) -> Vec<&'static str> {
		vec![self.protocol.counterparty]
	}
}

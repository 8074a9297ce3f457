use crate::integration::mocks::{create_test_native, create_test_token, MockAssetRegistry};

use evm_event_enricher::{
	models::{EVMReceiptLog, EVMTransaction, HistoryEventSubType, HistoryEventType},
	services::{
		decoder::{
			protocols::{DonationDecoder, CPT_GITCOIN, GITCOIN_ROUND_PROTOCOL},
			Decoder, DecoderError, DecoderRegistry,
		},
		enrichment::EnrichmentPipeline,
	},
	utils::tests::builders::evm::{
		bundle::BundleBuilder, event::EventBuilder, log::LogBuilder,
		transaction::TransactionBuilder,
	},
};

use alloy::primitives::{address, keccak256, Address, B256, U256};
use mockall::predicate;
use std::{collections::HashSet, sync::Arc};

const CHAIN_ID: u64 = 10;
const NATIVE_ID: &str = "eip155:10/slip44:60";
const DONOR: Address = Address::new([0xd0; 20]);
const GRANT: Address = Address::new([0x9a; 20]);
const ROUND: Address = Address::new([0x70; 20]);
const STRATEGY: Address = Address::new([0x57; 20]);
const USDC: Address = Address::new([0x0c; 20]);
const UNKNOWN_TOKEN: Address = Address::new([0xee; 20]);

fn mock_registry() -> MockAssetRegistry {
	let mut assets = MockAssetRegistry::new();
	assets
		.expect_get_addresses_by_protocol()
		.with(predicate::eq(CHAIN_ID), predicate::eq(GITCOIN_ROUND_PROTOCOL))
		.times(1)
		.returning(|_, _| HashSet::from([ROUND]));
	assets
		.expect_get_native_asset()
		.with(predicate::eq(CHAIN_ID))
		.returning(|_| Some(create_test_native(NATIVE_ID, "ETH")));
	assets.expect_get_asset().returning(|identifier: &str| {
		[
			create_test_native(NATIVE_ID, "ETH"),
			create_test_token(CHAIN_ID, USDC, "USDC", 6),
		]
		.into_iter()
		.find(|asset| asset.identifier == identifier)
	});
	assets
}

fn pipeline() -> EnrichmentPipeline {
	let assets = mock_registry();
	let mut registry = DecoderRegistry::new();
	registry
		.register(DonationDecoder::new(&assets, CHAIN_ID))
		.unwrap();
	EnrichmentPipeline::new(CHAIN_ID, Arc::new(registry), Arc::new(assets))
}

fn usdc_id() -> String {
	create_test_token(CHAIN_ID, USDC, "USDC", 6).identifier
}

fn voted_log(
	log_index: u64,
	voter: Address,
	token: Address,
	raw_amount: U256,
	round: Address,
) -> EVMReceiptLog {
	vote_for(log_index, voter, GRANT, token, raw_amount, round)
}

fn vote_for(
	log_index: u64,
	voter: Address,
	grant: Address,
	token: Address,
	raw_amount: U256,
	round: Address,
) -> EVMReceiptLog {
	let mut data = Vec::new();
	data.extend_from_slice(token.into_word().as_slice());
	data.extend_from_slice(&raw_amount.to_be_bytes::<32>());
	data.extend_from_slice(grant.into_word().as_slice());
	data.extend_from_slice(&U256::from(12).to_be_bytes::<32>());

	LogBuilder::new()
		.log_index(log_index)
		.address(STRATEGY)
		.topic(
			keccak256("Voted(address,uint256,address,address,bytes32,uint256,address)").to_vec(),
		)
		.address_topic(voter)
		.topic(B256::with_last_byte(0x42).to_vec())
		.address_topic(round)
		.data(data)
		.build()
}

fn legacy_vote(log_index: u64, voter: Address, token: Address, raw_amount: U256) -> EVMReceiptLog {
	let mut data = Vec::new();
	data.extend_from_slice(token.into_word().as_slice());
	data.extend_from_slice(&raw_amount.to_be_bytes::<32>());
	data.extend_from_slice(GRANT.into_word().as_slice());

	LogBuilder::new()
		.log_index(log_index)
		.address(STRATEGY)
		.topic(keccak256("Voted(address,uint256,address,address,bytes32,address)").to_vec())
		.address_topic(voter)
		.topic(B256::with_last_byte(0x43).to_vec())
		.address_topic(ROUND)
		.data(data)
		.build()
}

/// Allo v2 strategies register as rounds themselves
fn allocated_log(
	log_index: u64,
	recipient: Address,
	token: Address,
	raw_amount: U256,
	sender: Address,
) -> EVMReceiptLog {
	let mut data = Vec::new();
	data.extend_from_slice(&raw_amount.to_be_bytes::<32>());
	data.extend_from_slice(token.into_word().as_slice());
	data.extend_from_slice(sender.into_word().as_slice());

	LogBuilder::new()
		.log_index(log_index)
		.address(ROUND)
		.topic(keccak256("Allocated(address,uint256,address,address)").to_vec())
		.address_topic(recipient)
		.data(data)
		.build()
}

fn usdc_transfer(log_index: u64, from: Address, to: Address, raw_amount: U256) -> EVMReceiptLog {
	LogBuilder::new()
		.log_index(log_index)
		.address(USDC)
		.transfer(from, to, raw_amount)
		.build()
}

fn donor_transaction() -> EVMTransaction {
	TransactionBuilder::new()
		.chain_id(CHAIN_ID)
		.from(DONOR)
		.to(STRATEGY)
		.build()
}

#[test]
fn test_decoder_exposes_rounds_and_hint() {
	let assets = mock_registry();
	let decoder = DonationDecoder::new(&assets, CHAIN_ID);

	assert_eq!(decoder.matched_addresses(), &HashSet::from([ROUND]));
	assert_eq!(decoder.counterparty_tags(), vec![CPT_GITCOIN]);
	assert_eq!(decoder.hint_rules().len(), 1);
	assert_eq!(decoder.enrichment_rules().len(), 2);
}

#[test]
fn test_native_donation_without_log_is_reclassified() {
	let bundle = BundleBuilder::new()
		.transaction(
			TransactionBuilder::new()
				.chain_id(CHAIN_ID)
				.from(DONOR)
				.to(STRATEGY)
				.build(),
		)
		.log(voted_log(
			7,
			DONOR,
			Address::ZERO,
			U256::from(3_000_000_000_000_000u64),
			ROUND,
		))
		.event(
			EventBuilder::new()
				.spend()
				.asset(NATIVE_ID)
				.amount("0.003")
				.location_label(DONOR)
				.address(STRATEGY)
				.build(),
		)
		.build();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	assert!(decoded.is_complete());
	let event = &decoded.events[0];
	assert_eq!(event.event_type, HistoryEventType::Spend);
	assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
	assert_eq!(event.counterparty.as_deref(), Some(CPT_GITCOIN));
	assert_eq!(event.address, Some(GRANT));
	assert_eq!(
		event.notes,
		Some(format!("Make a gitcoin donation of 0.003 ETH to {}", GRANT))
	);
	let extra = event.extra_data.as_ref().unwrap();
	assert_eq!(extra["application_index"], "12");
}

#[test]
fn test_donation_between_tracked_accounts_is_a_transfer() {
	let bundle = BundleBuilder::new()
		.transaction(
			TransactionBuilder::new()
				.chain_id(CHAIN_ID)
				.from(DONOR)
				.to(STRATEGY)
				.build(),
		)
		.log(voted_log(
			1,
			DONOR,
			USDC,
			U256::from(25_000_000u64),
			ROUND,
		))
		.log(
			LogBuilder::new()
				.log_index(2)
				.address(USDC)
				.transfer(DONOR, GRANT, U256::from(25_000_000u64))
				.build(),
		)
		.event_for_log(
			2,
			EventBuilder::new()
				.spend()
				.asset(usdc_id())
				.amount("25")
				.location_label(DONOR)
				.address(GRANT)
				.build(),
		)
		.event_for_log(
			2,
			EventBuilder::new()
				.receive()
				.asset(usdc_id())
				.amount("25")
				.location_label(GRANT)
				.address(DONOR)
				.build(),
		)
		.tracked(GRANT)
		.build();
	let original_receive = bundle.events[1].clone();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	let spend = &decoded.events[0];
	assert_eq!(spend.event_type, HistoryEventType::Transfer);
	assert_eq!(spend.event_subtype, HistoryEventSubType::Donate);
	assert_eq!(
		spend.notes,
		Some(format!(
			"Transfer a gitcoin donation of 25 USDC to {}",
			GRANT
		))
	);
	// The transfer starts at the tx origin, so only the donor side is a donation
	assert_eq!(decoded.events[1], original_receive);
}

#[test]
fn test_incoming_donation_from_untracked_voter() {
	let relayer = Address::new([0x5e; 20]);
	let bundle = BundleBuilder::new()
		.transaction(
			TransactionBuilder::new()
				.chain_id(CHAIN_ID)
				.from(relayer)
				.to(STRATEGY)
				.build(),
		)
		.log(voted_log(
			1,
			DONOR,
			USDC,
			U256::from(25_000_000u64),
			ROUND,
		))
		.log(
			LogBuilder::new()
				.log_index(2)
				.address(USDC)
				.transfer(DONOR, GRANT, U256::from(25_000_000u64))
				.build(),
		)
		.event_for_log(
			2,
			EventBuilder::new()
				.receive()
				.asset(usdc_id())
				.amount("25")
				.location_label(GRANT)
				.address(DONOR)
				.build(),
		)
		.tracked(GRANT)
		.build();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	let event = &decoded.events[0];
	assert_eq!(event.event_type, HistoryEventType::Receive);
	assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
	assert_eq!(event.address, Some(DONOR));
	assert_eq!(
		event.notes,
		Some(format!(
			"Receive a gitcoin donation of 25 USDC from {}",
			DONOR
		))
	);
}

#[test]
fn test_vote_outside_known_rounds_is_ignored() {
	let bundle = BundleBuilder::new()
		.transaction(TransactionBuilder::new().chain_id(CHAIN_ID).from(DONOR).build())
		.log(voted_log(
			7,
			DONOR,
			Address::ZERO,
			U256::from(3_000_000_000_000_000u64),
			Address::new([0x01; 20]),
		))
		.event(
			EventBuilder::new()
				.spend()
				.asset(NATIVE_ID)
				.amount("0.003")
				.location_label(DONOR)
				.build(),
		)
		.build();
	let original = bundle.events.clone();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	assert!(decoded.is_complete());
	assert_eq!(decoded.events, original);
}

#[test]
fn test_vote_in_unknown_token_is_reported_without_sequence() {
	let bundle = BundleBuilder::new()
		.transaction(TransactionBuilder::new().chain_id(CHAIN_ID).from(DONOR).build())
		.log(voted_log(
			7,
			DONOR,
			UNKNOWN_TOKEN,
			U256::from(1u64),
			ROUND,
		))
		.event(
			EventBuilder::new()
				.spend()
				.asset(NATIVE_ID)
				.amount("0.003")
				.location_label(DONOR)
				.build(),
		)
		.build();
	let original = bundle.events.clone();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	assert_eq!(decoded.events, original);
	assert_eq!(decoded.failures.len(), 1);
	assert_eq!(decoded.failures[0].log_index, 7);
	assert_eq!(decoded.failures[0].sequence_index, None);
	assert!(matches!(
		decoded.failures[0].error,
		DecoderError::AssetResolution(_)
	));
}

#[test]
fn test_same_amount_token_donations_keep_their_grants() {
	let grant_a = Address::new([0xa1; 20]);
	let grant_b = Address::new([0xb2; 20]);
	let raw = U256::from(2_000_000u64);
	let spend_to = |grant: Address| {
		EventBuilder::new()
			.spend()
			.asset(usdc_id())
			.amount("2")
			.location_label(DONOR)
			.address(grant)
			.build()
	};
	let bundle = BundleBuilder::new()
		.transaction(donor_transaction())
		.log(usdc_transfer(0, DONOR, grant_a, raw))
		.log(vote_for(1, DONOR, grant_a, USDC, raw, ROUND))
		.log(usdc_transfer(2, DONOR, grant_b, raw))
		.log(vote_for(3, DONOR, grant_b, USDC, raw, ROUND))
		.event_for_log(0, spend_to(grant_a))
		.event_for_log(2, spend_to(grant_b))
		.build();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	assert!(decoded.is_complete());
	for (event, grant) in decoded.events.iter().zip([grant_a, grant_b]) {
		assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
		assert_eq!(event.address, Some(grant));
		assert_eq!(
			event.notes,
			Some(format!("Make a gitcoin donation of 2 USDC to {}", grant))
		);
	}
}

#[test]
fn test_many_native_donations_in_one_transaction() {
	let grants = [
		Address::new([0x01; 20]),
		Address::new([0x02; 20]),
		Address::new([0x03; 20]),
		GRANT,
	];
	let raw = U256::from(600_000_000_000_000u64);
	let mut builder = BundleBuilder::new().transaction(donor_transaction()).tracked(GRANT);
	for (log_index, grant) in (10u64..).zip(grants) {
		builder = builder.log(vote_for(log_index, DONOR, grant, Address::ZERO, raw, ROUND));
	}
	for _ in grants {
		builder = builder.event(
			EventBuilder::new()
				.spend()
				.asset(NATIVE_ID)
				.amount("0.0006")
				.location_label(DONOR)
				.address(STRATEGY)
				.build(),
		);
	}

	let decoded = pipeline().decode_transaction(builder.build()).unwrap();

	assert!(decoded.is_complete());
	assert_eq!(decoded.events.len(), grants.len());
	for (event, grant) in decoded.events.iter().zip(grants) {
		assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
		assert_eq!(event.address, Some(grant));
	}
	let last = &decoded.events[3];
	assert_eq!(last.event_type, HistoryEventType::Transfer);
	assert_eq!(
		last.notes,
		Some(format!("Transfer a gitcoin donation of 0.0006 ETH to {}", GRANT))
	);
	assert!(decoded.events[..3]
		.iter()
		.all(|event| event.event_type == HistoryEventType::Spend));
}

#[test]
fn test_legacy_vote_without_application_index() {
	let bundle = BundleBuilder::new()
		.transaction(donor_transaction())
		.log(legacy_vote(
			4,
			DONOR,
			Address::ZERO,
			U256::from(1_000_000_000_000_000u64),
		))
		.event(
			EventBuilder::new()
				.spend()
				.asset(NATIVE_ID)
				.amount("0.001")
				.location_label(DONOR)
				.build(),
		)
		.build();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	let event = &decoded.events[0];
	assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
	assert_eq!(event.address, Some(GRANT));
	let extra = event.extra_data.as_ref().unwrap();
	assert!(extra.contains_key("project_id"));
	assert!(!extra.contains_key("application_index"));
}

#[test]
fn test_allocated_token_donation_after_its_transfer() {
	let second_grant = Address::new([0xb2; 20]);
	let raw = U256::from(5_000_000u64);
	let bundle = BundleBuilder::new()
		.transaction(donor_transaction())
		.log(usdc_transfer(1, DONOR, GRANT, raw))
		.log(allocated_log(2, GRANT, USDC, raw, DONOR))
		.log(usdc_transfer(3, DONOR, second_grant, raw))
		.log(allocated_log(4, second_grant, USDC, raw, DONOR))
		.event_for_log(
			1,
			EventBuilder::new()
				.spend()
				.asset(usdc_id())
				.amount("5")
				.location_label(DONOR)
				.address(GRANT)
				.build(),
		)
		.event_for_log(
			3,
			EventBuilder::new()
				.spend()
				.asset(usdc_id())
				.amount("5")
				.location_label(DONOR)
				.address(second_grant)
				.build(),
		)
		.build();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	assert!(decoded.is_complete());
	for (event, grant) in decoded.events.iter().zip([GRANT, second_grant]) {
		assert_eq!(event.event_type, HistoryEventType::Spend);
		assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
		assert_eq!(event.address, Some(grant));
		assert_eq!(
			event.notes,
			Some(format!("Make a gitcoin donation of 5 USDC to {}", grant))
		);
		assert!(event.extra_data.is_none());
	}
}

#[test]
fn test_allocated_token_received_by_tracked_grant() {
	let relayer = Address::new([0x5e; 20]);
	let raw = U256::from(1_500_000u64);
	let bundle = BundleBuilder::new()
		.transaction(
			TransactionBuilder::new()
				.chain_id(CHAIN_ID)
				.from(relayer)
				.to(ROUND)
				.build(),
		)
		.log(usdc_transfer(1, DONOR, GRANT, raw))
		.log(allocated_log(2, GRANT, USDC, raw, DONOR))
		.event_for_log(
			1,
			EventBuilder::new()
				.receive()
				.asset(usdc_id())
				.amount("1.5")
				.location_label(GRANT)
				.address(DONOR)
				.build(),
		)
		.tracked(GRANT)
		.build();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	let event = &decoded.events[0];
	assert_eq!(event.event_type, HistoryEventType::Receive);
	assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
	assert_eq!(
		event.notes,
		Some(format!(
			"Receive a gitcoin donation of 1.5 USDC from {}",
			DONOR
		))
	);
}

#[test]
fn test_allocated_native_donation() {
	let bundle = BundleBuilder::new()
		.transaction(donor_transaction())
		.log(allocated_log(
			6,
			GRANT,
			address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"),
			U256::from(250_000_000_000_000u64),
			DONOR,
		))
		.event(
			EventBuilder::new()
				.spend()
				.asset(NATIVE_ID)
				.amount("0.00025")
				.location_label(DONOR)
				.address(ROUND)
				.build(),
		)
		.build();

	let decoded = pipeline().decode_transaction(bundle).unwrap();

	let event = &decoded.events[0];
	assert_eq!(event.event_subtype, HistoryEventSubType::Donate);
	assert_eq!(event.address, Some(GRANT));
	assert_eq!(
		event.notes,
		Some(format!("Make a gitcoin donation of 0.00025 ETH to {}", GRANT))
	);
}

#![no_main]

use alloy::primitives::{Address, Bytes};
use evm_event_enricher::{
	models::{Asset, EVMReceiptLog},
	services::decoder::helpers::evm::{
		address_from_data, address_from_topic, amount_from_data, denormalize_amount,
		normalize_amount, topic_address, topic_word, WORD_SIZE,
	},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
	let Some((&decimals, payload)) = data.split_first() else {
		return;
	};

	let _ = address_from_topic(payload);
	let _ = address_from_data(payload, 0);

	let log = EVMReceiptLog {
		log_index: 0,
		address: Address::ZERO,
		topics: payload
			.chunks(WORD_SIZE)
			.map(|chunk| Bytes::copy_from_slice(chunk))
			.collect(),
		data: Bytes::copy_from_slice(payload),
	};
	for index in 0..4 {
		let _ = topic_address(&log, index);
		let _ = topic_word(&log, index);
	}

	let asset = Asset {
		identifier: "FUZZ".to_string(),
		symbol: "FUZZ".to_string(),
		name: None,
		decimals: Some(decimals % 78),
		address: None,
		protocol: None,
		underlying: None,
	};
	for index in 0..4 {
		if let Ok(raw) = amount_from_data(payload, index) {
			let amount = normalize_amount(raw, &asset).expect("asset has a precision");
			assert_eq!(denormalize_amount(&amount, &asset).ok(), Some(raw));
		}
	}
});

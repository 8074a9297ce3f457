//! Helper functions for EVM log decoding.
//!
//! This module converts the raw, ABI-encoded parts of a receipt log into typed
//! values: indexed addresses from topics, 32-byte words from the data payload,
//! and decimal amounts scaled by an asset's precision.

use alloy::primitives::{b256, Address, B256, U256};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};

use crate::{
	models::{Asset, EVMReceiptLog},
	services::decoder::DecoderError,
};

/// Size of a topic and of an ABI data word
pub const WORD_SIZE: usize = 32;

const ADDRESS_SIZE: usize = 20;

/// topic[0] of ERC20 `Transfer(address,address,uint256)`
pub const ERC20_TRANSFER_TOPIC: B256 =
	b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// Decodes an indexed `address` argument from a topic.
///
/// The address is the low-order 20 bytes of the 32-byte topic.
///
/// # Errors
/// Returns `MalformedLog` if the topic is not exactly 32 bytes long
pub fn address_from_topic(topic: &[u8]) -> Result<Address, DecoderError> {
	if topic.len() != WORD_SIZE {
		return Err(DecoderError::malformed_log(format!(
			"topic must be {} bytes, got {}",
			WORD_SIZE,
			topic.len()
		)));
	}
	Ok(Address::from_slice(&topic[WORD_SIZE - ADDRESS_SIZE..]))
}

/// Decodes the address in `log.topics[index]`, or None if the log has no such topic
pub fn topic_address(log: &EVMReceiptLog, index: usize) -> Result<Option<Address>, DecoderError> {
	log.topic(index)
		.map(|topic| address_from_topic(topic.as_ref()))
		.transpose()
}

/// Reads `log.topics[index]` as a raw word, or None if the log has no such topic
///
/// # Errors
/// Returns `MalformedLog` if the topic is not exactly 32 bytes long
pub fn topic_word(log: &EVMReceiptLog, index: usize) -> Result<Option<B256>, DecoderError> {
	let Some(topic) = log.topic(index) else {
		return Ok(None);
	};
	B256::try_from(topic.as_ref()).map(Some).map_err(|_| {
		DecoderError::malformed_log(format!(
			"topic must be {} bytes, got {}",
			WORD_SIZE,
			topic.len()
		))
	})
}

/// Reads the `index`-th 32-byte word of `data` as a big-endian unsigned integer.
///
/// # Errors
/// Returns `MalformedLog` if `data` holds fewer than `index + 1` words
pub fn amount_from_data(data: &[u8], index: usize) -> Result<U256, DecoderError> {
	let start = index * WORD_SIZE;
	let Some(word) = data.get(start..start + WORD_SIZE) else {
		return Err(DecoderError::malformed_log(format!(
			"data has {} bytes, expected at least {} words",
			data.len(),
			index + 1
		)));
	};
	Ok(U256::from_be_slice(word))
}

/// Reads the `index`-th 32-byte word of `data` as an ABI-encoded address
pub fn address_from_data(data: &[u8], index: usize) -> Result<Address, DecoderError> {
	let start = index * WORD_SIZE;
	let Some(word) = data.get(start..start + WORD_SIZE) else {
		return Err(DecoderError::malformed_log(format!(
			"data has {} bytes, expected at least {} words",
			data.len(),
			index + 1
		)));
	};
	address_from_topic(word)
}

/// Scales a raw integer amount by `10^-decimals` of the given asset.
///
/// # Errors
/// Returns `AssetResolution` if the asset's precision is unknown
pub fn normalize_amount(raw: U256, asset: &Asset) -> Result<BigDecimal, DecoderError> {
	let decimals = asset_decimals(asset)?;
	let digits = BigInt::from_bytes_be(Sign::Plus, &raw.to_be_bytes::<WORD_SIZE>());
	Ok(BigDecimal::new(digits, i64::from(decimals)))
}

/// Inverse of [`normalize_amount`]: scales a decimal amount back to its raw integer.
///
/// # Errors
/// - `AssetResolution` if the asset's precision is unknown
/// - `MalformedLog` if the amount is negative, has more fractional digits than
///   the asset's precision, or does not fit in 256 bits
pub fn denormalize_amount(amount: &BigDecimal, asset: &Asset) -> Result<U256, DecoderError> {
	let decimals = asset_decimals(asset)?;
	let scaled = amount.with_scale(i64::from(decimals));
	if scaled != *amount {
		return Err(DecoderError::malformed_log(format!(
			"{} has more than {} fractional digits",
			amount, decimals
		)));
	}

	let (digits, _) = scaled.into_bigint_and_exponent();
	let (sign, bytes) = digits.to_bytes_be();
	if sign == Sign::Minus {
		return Err(DecoderError::malformed_log(format!(
			"{} is negative",
			amount
		)));
	}
	U256::try_from_be_slice(&bytes)
		.ok_or_else(|| DecoderError::malformed_log(format!("{} does not fit in 256 bits", amount)))
}

/// Formats an amount for human-readable notes, without trailing zeros or exponents
pub fn format_amount(amount: &BigDecimal) -> String {
	amount.normalized().to_plain_string()
}

/// Converts a B256 hash to its hexadecimal string representation.
pub fn b256_to_string(hash: B256) -> String {
	format!("0x{}", hex::encode(hash.as_slice()))
}

fn asset_decimals(asset: &Asset) -> Result<u8, DecoderError> {
	asset.decimals.ok_or_else(|| {
		DecoderError::asset_resolution(format!(
			"precision of asset {} is unknown",
			asset.identifier
		))
	})
}

//! Asset registry data structures.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// A fungible unit of value (native coin or token)
///
/// `decimals` is the precision used to scale raw integer amounts. It is optional
/// because registry entries may be known by identity before their metadata has
/// been resolved; such assets cannot be used to normalize amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
	/// Unique identifier, e.g. `ETH` or `eip155:1/erc20:0x...`
	#[serde(default)]
	pub identifier: String,

	pub symbol: String,

	#[serde(default)]
	pub name: Option<String>,

	#[serde(default)]
	pub decimals: Option<u8>,

	/// Contract address for tokens, None for native coins
	#[serde(default)]
	pub address: Option<Address>,

	/// Protocol tag the token's contract belongs to (e.g. `pickle_jar`)
	#[serde(default)]
	pub protocol: Option<String>,

	/// Identifier of the asset a wrapped token represents. Vault decoders only
	/// accept deposits and withdrawals of this asset.
	#[serde(default)]
	pub underlying: Option<String>,
}

impl Asset {
	/// Identifier of the ERC20 token living at `address` on `chain_id`
	pub fn evm_token_identifier(chain_id: u64, address: &Address) -> String {
		format!("eip155:{}/erc20:{}", chain_id, address.to_checksum(None))
	}
}

/// A protocol contract that is not a token itself, such as a grant round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolContract {
	pub address: Address,

	/// Protocol tag decoders look the contract up by
	pub protocol: String,

	#[serde(default)]
	pub name: Option<String>,
}

/// A set of assets known for one chain, as stored in one configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCollection {
	pub chain_id: u64,

	/// The chain's native coin
	#[serde(default)]
	pub native: Option<Asset>,

	#[serde(default)]
	pub assets: Vec<Asset>,

	/// Non-token contracts tagged with a protocol
	#[serde(default)]
	pub contracts: Vec<ProtocolContract>,
}

impl AssetCollection {
	/// Fills in token identifiers that were left out of the configuration
	pub fn with_derived_identifiers(mut self) -> Self {
		let chain_id = self.chain_id;
		for asset in self.assets.iter_mut() {
			if asset.identifier.is_empty() {
				if let Some(address) = &asset.address {
					asset.identifier = Asset::evm_token_identifier(chain_id, address);
				}
			}
		}
		self
	}

	/// Iterates over the native coin (if any) followed by the tokens
	pub fn iter(&self) -> impl Iterator<Item = &Asset> {
		self.native.iter().chain(self.assets.iter())
	}
}

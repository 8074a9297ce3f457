//! Asset registry implementation.
//!
//! This module provides storage and retrieval of assets and protocol contract
//! addresses, loaded from JSON configuration files. Decoders consume the
//! registry through `AssetRegistryTrait` so tests can substitute a double.

use std::{
	collections::{HashMap, HashSet},
	path::Path,
};

use alloy::primitives::Address;

use crate::{
	models::{Asset, AssetCollection, ConfigLoader},
	repositories::error::RepositoryError,
};

/// Interface decoders and the pipeline use to query the asset registry
///
/// Implementations must be cheap, synchronous lookups. Anything slower belongs
/// behind a caching layer outside this crate.
pub trait AssetRegistryTrait: Send + Sync {
	/// All contract addresses tagged with `protocol` on `chain_id`
	fn get_addresses_by_protocol(&self, chain_id: u64, protocol: &str) -> HashSet<Address>;

	/// Resolve an asset by identifier
	fn get_asset(&self, identifier: &str) -> Option<Asset>;

	/// The native coin of `chain_id`
	fn get_native_asset(&self, chain_id: u64) -> Option<Asset>;
}

/// Immutable, file-backed asset registry snapshot
#[derive(Debug, Clone, Default)]
pub struct AssetRepository {
	assets: HashMap<String, Asset>,
	natives: HashMap<u64, String>,
	protocols: HashMap<(u64, String), HashSet<Address>>,
}

impl AssetRepository {
	/// Load every asset file in `path` (default `config/assets`)
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let collections: HashMap<String, AssetCollection> = AssetCollection::load_all(path)
			.map_err(|e| RepositoryError::load_error(format!("Failed to load assets: {}", e)))?;
		Self::from_collections(collections.into_values())
	}

	/// Build the registry from already loaded collections
	///
	/// Fails if two collections define the same asset identifier or the same
	/// chain's native coin.
	pub fn from_collections(
		collections: impl IntoIterator<Item = AssetCollection>,
	) -> Result<Self, RepositoryError> {
		let mut repository = Self::default();

		for collection in collections {
			let collection = collection.with_derived_identifiers();

			if let Some(native) = &collection.native {
				if repository
					.natives
					.insert(collection.chain_id, native.identifier.clone())
					.is_some()
				{
					return Err(RepositoryError::validation_error(format!(
						"Native asset for chain {} is defined more than once",
						collection.chain_id
					)));
				}
			}

			for asset in collection.iter() {
				if let (Some(protocol), Some(address)) = (&asset.protocol, asset.address) {
					repository
						.protocols
						.entry((collection.chain_id, protocol.clone()))
						.or_default()
						.insert(address);
				}

				if repository
					.assets
					.insert(asset.identifier.clone(), asset.clone())
					.is_some()
				{
					return Err(RepositoryError::validation_error(format!(
						"Asset {} is defined more than once",
						asset.identifier
					)));
				}
			}

			for contract in &collection.contracts {
				repository
					.protocols
					.entry((collection.chain_id, contract.protocol.clone()))
					.or_default()
					.insert(contract.address);
			}
		}

		tracing::debug!(
			assets = repository.assets.len(),
			protocols = repository.protocols.len(),
			"Loaded asset registry"
		);

		Ok(repository)
	}

	/// Number of known assets
	pub fn len(&self) -> usize {
		self.assets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.assets.is_empty()
	}
}

impl AssetRegistryTrait for AssetRepository {
	fn get_addresses_by_protocol(&self, chain_id: u64, protocol: &str) -> HashSet<Address> {
		self.protocols
			.get(&(chain_id, protocol.to_string()))
			.cloned()
			.unwrap_or_default()
	}

	fn get_asset(&self, identifier: &str) -> Option<Asset> {
		self.assets.get(identifier).cloned()
	}

	fn get_native_asset(&self, chain_id: u64) -> Option<Asset> {
		self.natives
			.get(&chain_id)
			.and_then(|identifier| self.assets.get(identifier))
			.cloned()
	}
}

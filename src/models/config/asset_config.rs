//! Asset configuration loading and validation.
//!
//! Each JSON file under the asset directory describes one chain: its native
//! coin, its tokens and the protocol contracts decoders look up by tag.

use std::{collections::HashSet, path::Path};

use crate::models::{Asset, AssetCollection, ConfigLoader};

use super::error::ConfigError;

/// Largest precision a 256-bit integer amount can carry
const MAX_DECIMALS: u8 = 77;

impl ConfigLoader for AssetCollection {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let asset_dir = path.unwrap_or(Path::new("config/assets"));
		let mut pairs = Vec::new();

		if !asset_dir.exists() {
			return Err(ConfigError::file_error("assets directory not found"));
		}

		for entry in std::fs::read_dir(asset_dir)? {
			let entry = entry?;
			let path = entry.path();

			if !Self::is_json_file(&path) {
				continue;
			}

			let name = path
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("unknown")
				.to_string();

			match Self::load_from_path(&path) {
				Ok(collection) => pairs.push((name, collection)),
				Err(e) => tracing::warn!(file = %path.display(), error = %e, "Skipping asset file"),
			}
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: AssetCollection = serde_json::from_reader(std::io::BufReader::new(file))
			.map_err(|e| ConfigError::parse_error(path, &e))?;

		let config = config.with_derived_identifiers();
		config.validate()?;

		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		let mut seen = HashSet::new();

		if let Some(native) = &self.native {
			if native.address.is_some() {
				return Err(ConfigError::validation_error(format!(
					"Native asset {} must not have a contract address",
					native.symbol
				)));
			}
			if native.identifier.is_empty() {
				return Err(ConfigError::validation_error(
					"Native asset must have an identifier",
				));
			}
		}

		for asset in &self.assets {
			let Some(address) = &asset.address else {
				return Err(ConfigError::validation_error(format!(
					"Token {} must have a contract address",
					asset.symbol
				)));
			};

			let expected = Asset::evm_token_identifier(self.chain_id, address);
			if asset.identifier != expected {
				return Err(ConfigError::validation_error(format!(
					"Token identifier {} does not match its address (expected {})",
					asset.identifier, expected
				)));
			}
		}

		for contract in &self.contracts {
			if contract.protocol.trim().is_empty() {
				return Err(ConfigError::validation_error(format!(
					"Contract {} must have a protocol",
					contract.address
				)));
			}
		}

		for asset in self.iter() {
			if asset.symbol.trim().is_empty() {
				return Err(ConfigError::validation_error(format!(
					"Asset {} must have a symbol",
					asset.identifier
				)));
			}

			if asset.decimals.is_some_and(|decimals| decimals > MAX_DECIMALS) {
				return Err(ConfigError::validation_error(format!(
					"Asset {} decimals must be at most {}",
					asset.identifier, MAX_DECIMALS
				)));
			}

			if !seen.insert(asset.identifier.as_str()) {
				return Err(ConfigError::validation_error(format!(
					"Duplicate asset identifier {}",
					asset.identifier
				)));
			}
		}

		Ok(())
	}
}

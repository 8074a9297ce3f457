//! Repository implementations for the asset registry.
//!
//! The registry answers two questions for decoders: which contract addresses
//! belong to a protocol, and what an asset identifier resolves to. It is loaded
//! once and read concurrently afterwards.

mod asset;
mod error;

pub use asset::{AssetRegistryTrait, AssetRepository};
pub use error::RepositoryError;

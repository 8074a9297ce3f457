//! Domain models and data structures for transaction enrichment.
//!
//! This module contains all the core data structures used throughout the application:
//!
//! - `blockchain`: Chain data as observed on-chain (transactions, receipt logs)
//! - `config`: Configuration loading and validation
//! - `core`: Core domain models (assets, history events, action items)

mod blockchain;
mod config;
mod core;

// Re-export blockchain types
pub use blockchain::evm::{EVMReceiptLog, EVMTransaction, EVMTransactionBundle};

// Re-export core types
pub use core::{
	ActionItem, Asset, AssetCollection, Classification, HistoryEvent, HistoryEventSubType,
	HistoryEventType, ProtocolContract,
};

// Re-export config types
pub use config::{ConfigError, ConfigLoader};

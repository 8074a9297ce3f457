//! Semantic enrichment of decoded EVM transaction history.
//!
//! This library takes the provisional history events produced for a transaction
//! (one generic SPEND/RECEIVE per asset movement) together with the transaction's
//! receipt logs, and reclassifies those events into their protocol-specific meaning
//! (vault deposits, wrapped token receipts, donations and so on).
//!
//! # Architecture
//! - Models: chain data (transactions, receipt logs) and history events
//! - Repositories: the asset/address registry consumed by decoders
//! - Services: protocol decoders, the decoder registry and the enrichment pipeline
//!
//! # Flow
//! 1. Load the asset registry snapshot
//! 2. Build the decoder registry, which captures each protocol's contract addresses
//! 3. Feed transaction bundles through the enrichment pipeline
//! 4. Hand the reclassified events to storage or reporting

pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

//! Core services implementing the enrichment logic.
//!
//! This module contains the main service implementations:
//! - `decoder`: Per-protocol decoders, their shared contract and the decoder registry
//! - `enrichment`: The per-transaction enrichment pipeline

pub mod decoder;
pub mod enrichment;

//! Transaction enrichment.
//!
//! The pipeline walks a transaction's receipt logs in on-chain order and lets
//! the registered decoders reclassify the provisional events built from them.

mod error;
mod pipeline;

pub use error::EnrichmentError;
pub use pipeline::{DecodedTransaction, EnrichmentPipeline, LogFailure};

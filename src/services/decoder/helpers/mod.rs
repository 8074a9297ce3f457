//! Chain-specific helper functions for decoders.
//!
//! - `evm`: topic/data word decoding and amount normalization

pub mod evm;

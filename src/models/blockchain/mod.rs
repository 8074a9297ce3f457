//! Blockchain-specific model implementations.
//!
//! Only EVM chains are modelled. Every type here is immutable once observed.

pub mod evm;

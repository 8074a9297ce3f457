//! Per-protocol decoder implementations.
//!
//! - `vault`: deposit/withdraw vaults that mint a wrapped share token (Pickle jars)
//! - `donation`: Gitcoin grant round donations and matching payouts

mod donation;
mod vault;

pub use donation::{DonationDecoder, CPT_GITCOIN, GITCOIN_ROUND_PROTOCOL};
pub use vault::{VaultDecoder, VaultProtocol, CPT_PICKLE, PICKLE_JAR_PROTOCOL};

//! Ethereum Virtual Machine (EVM) chain data.
//!
//! Transactions, their receipt logs, and the bundle handed to the enrichment
//! pipeline for a single transaction.

mod bundle;
mod receipt;
mod transaction;

pub use bundle::TransactionBundle as EVMTransactionBundle;
pub use receipt::ReceiptLog as EVMReceiptLog;
pub use transaction::Transaction as EVMTransaction;

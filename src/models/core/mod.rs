//! Core domain models for history enrichment.
//!
//! This module contains the fundamental data structures that represent:
//! - Assets: fungible units of value and their precision
//! - History events: the accounting events decoders classify
//! - Action items: forward hints passed between logs of one transaction

mod action_item;
mod asset;
mod event;

pub use action_item::ActionItem;
pub use asset::{Asset, AssetCollection, ProtocolContract};
pub use event::{Classification, HistoryEvent, HistoryEventSubType, HistoryEventType};

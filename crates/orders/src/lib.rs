//! Orders domain module.
//!
//! This crate contains the order entity and the stock reconciliation policy
//! applied when an order is placed, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage). Loading and persisting the records the
//! policy works on is the job of the infrastructure layer.

pub mod order;
pub mod placement;

pub use order::{Order, OrderDraft, zero_timestamp};
pub use placement::StockLedger;

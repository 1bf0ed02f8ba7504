//! Products domain module.
//!
//! A product is a stock item the kitchen draws portions from. This crate holds
//! its field rules and the portion bookkeeping used by order placement, as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{MIN_QUANTITY, Product, ProductDraft};

//! Menu domain module.
//!
//! A menu item is a named dish plus its bill-of-materials: the set of products
//! one serving draws a portion from.

pub mod menu_item;

pub use menu_item::{MenuItem, MenuItemDraft};

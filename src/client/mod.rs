//! Presentation-tier helpers for the rendered tag list.

pub mod manager;
pub mod search_cache;

pub use manager::*;
pub use search_cache::*;

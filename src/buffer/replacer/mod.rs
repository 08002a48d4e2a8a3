//! Eviction policy implementations (replacers).
//!
//! - [`LruReplacer`] - evicts the frame released longest ago

mod lru_replacer;

pub use lru_replacer::LruReplacer;

//! Utility functions for money conversion and string formatting.

pub mod format;
pub mod money;

// Re-export commonly used functions at module level
pub use format::truncate_string;
pub use money::{from_minor, to_minor};

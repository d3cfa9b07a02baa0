//! Utility functions for colors, datetimes and string formatting.

pub mod color;
pub mod datetime;
pub mod format;

// Re-export commonly used functions at module level
pub use color::{contrast_text, darken, event_palette, normalize_hex};
pub use datetime::{parse_local_input, to_local_input};
pub use format::{contains_ignore_case, display_or, truncate};

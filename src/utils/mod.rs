//! Utility Module
//!
//! Small helpers shared by the preprocessing pipeline:
//!
//! - [`split_delimited`]: delimiter tokenizer producing parallel
//!   parts/separators sequences

pub mod split;

pub use split::{SplitText, split_delimited};

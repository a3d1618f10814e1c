//! Channel layer for pattern matching on the interactive byte stream.
//!
//! This module handles prompt-pattern compilation, tail-searched output
//! buffering with ANSI stripping, and splitting captured output into lines.

mod buffer;
mod patterns;

pub use buffer::PatternBuffer;
pub use patterns::{combine_patterns, compile_prompt_pattern, split_lines};

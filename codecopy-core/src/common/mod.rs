//! Shared character constants and compiled patterns.

pub mod chars;
pub mod patterns;

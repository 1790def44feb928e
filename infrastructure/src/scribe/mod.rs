//! Scribe adapters
//!
//! [`MarkdownScribe`] writes human-readable minutes when a session adjourns.

mod markdown;

pub use markdown::MarkdownScribe;

//! Database query modules.
//!
//! - settings: namespaced key-value settings with last-write-wins upserts
//! - patterns: ordered renamer regex substitutions

pub mod patterns;
pub mod settings;

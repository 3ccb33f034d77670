//! Core types shared by the replay statistics crates.
//!
//! Holds the canonical [`models::MatchRecord`] schema, the error type, lenient
//! timestamp/field coercion, display formatting and CLI settings.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{ReplayError, Result};

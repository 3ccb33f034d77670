//! Replay ingestion and aggregation.
//!
//! Decodes replay containers, extracts the embedded match payload, maps it
//! into canonical [`replay_core::models::MatchRecord`]s, and computes the
//! per-player rollups shown to the user.

pub mod aggregator;
pub mod container;
pub mod mapper;
pub mod payload;
pub mod reader;

pub use replay_core as core;

//! Session state and ingest driver for the replay statistics tool.
//!
//! Owns the persisted [`session_store::SessionStore`] and feeds it one replay
//! file at a time through the decode pipeline.

pub mod ingest;
pub mod session_store;

pub use replay_core as core;
pub use replay_data as data;

//! snapship - release automation for snap packages
//!
//! Synthesizes changelogs from merge history, diffs dependency manifests
//! against the last published snap, and drives the build/commit/tag/push
//! sequence of a release.

pub mod changelog;
pub mod commands;
pub mod core;
pub mod manifest;
pub mod release;
pub mod snap;
pub mod utils;

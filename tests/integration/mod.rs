//! Integration tests for the snapship CLI
//!
//! Each test builds a throwaway packaging repository with real git history
//! and drives the compiled binary against it.

mod helpers;

mod test_changelog;
mod test_manifest;
mod test_release;

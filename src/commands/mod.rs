//! Command implementations behind the CLI surface

pub mod changelog;
pub mod manifest;
pub mod release;

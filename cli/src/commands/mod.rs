//! CLI command implementations
//!
//! Each command module implements one group of db CLI commands.

pub mod database;
pub mod edit;
pub mod remigrate;

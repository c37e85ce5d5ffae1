//! Command Line Interface module
//!
//! - `fetch`: run the two-phase lyrics fetch against one source
//! - `sources`: list configured sources
//! - `config`: inspect configuration

pub mod config;
pub mod fetch;
pub mod sources;

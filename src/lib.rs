//! lyricsget: fetch song lyrics from pluggable web sources.
//!
//! The [`core`] module holds the provider abstraction, its two-phase fetch
//! protocol and the registry; [`config`] and [`error`] are shared with the
//! command-line front end.

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

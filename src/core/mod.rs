//! Core functionality modules
//!
//! - `lyrics`: the normalized lyrics record and its exports
//! - `selection`: search candidates and disambiguation state
//! - `provider`: the provider trait and two-phase fetch protocol
//! - `registry`: provider registration and lookup
//! - `providers`: built-in sources
//! - `http`: page transport shared by providers

pub mod http;
pub mod lyrics;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod selection;

pub use lyrics::LyricsRecord;
pub use provider::{FetchOutcome, FetchRequest, FetchState, LyricsProvider, ProviderContext, ProviderKind};
pub use registry::{LoadMode, ProviderRegistry, ProviderSlot};
pub use selection::{DisambiguationContext, SearchCandidate};

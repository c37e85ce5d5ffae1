//! Built-in lyrics sources.

pub mod amalgama;
pub mod genius;

pub use amalgama::AmalgamaProvider;
pub use genius::GeniusProvider;

use crate::core::registry::ProviderDescriptor;

/// Every provider compiled into this build, in registration order.
pub fn builtin() -> Vec<ProviderDescriptor> {
    vec![amalgama::descriptor(), genius::descriptor()]
}

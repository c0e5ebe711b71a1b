//! Storage interfaces consumed by the token services.

pub mod revocation;

pub use revocation::{InMemoryRevocationRegistry, RevocationRegistry};

//! Business services containing domain logic and use cases.

pub mod token;

// Re-export commonly used types
pub use token::{
    peek_claims, AutherConfig, AutherService, CleanupScheduler, JtiFallback, RotationController,
    TokenIssuer, TokenValidator,
};

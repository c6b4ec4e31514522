//! Credential models and the request signature engine.

pub mod credentials;
pub mod signature;

pub use credentials::*;
pub use signature::*;

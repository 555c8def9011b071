//! API request handlers.

/// Question answering.
pub mod ask;
/// Liveness check.
pub mod health;

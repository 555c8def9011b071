//! HTTP API handlers and routes
//!
//! The REST surface of the tutor, built on Axum.
//!
//! # Endpoints
//!
//! - `GET /test` - Liveness check, always `{"Message": "Foo"}`
//! - `POST /api/v1/ask` - Multipart form with `image`, `user_query` and `meta`;
//!   returns the tutor's answer
//! - `GET /api-docs/openapi.json` - OpenAPI document for the above
//!
//! Every route is open to any origin (CORS `*`). Failures are reported as
//! `{"status": "error", "code": ..., "message": ...}` with a matching HTTP status.

/// OpenAPI document.
pub mod docs;
/// Request handlers.
pub mod handlers;
/// Router configuration.
pub mod routes;

//! Backend-facing networking: wire DTOs and the auth REST client.

pub mod api;
pub mod types;

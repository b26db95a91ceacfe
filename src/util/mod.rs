//! Shared helpers for routes and views.

pub mod guard;

//! # authgate
//!
//! Client-side authentication session for a REST backend: register, log in,
//! persist the bearer token between runs, validate it at startup, gate
//! protected screens, and log out.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` talks to the backend, `state` owns the persisted token and the live
//! session, `util::guard` decides what a protected route renders, and `pages`
//! plus `app` turn that into screens for the hosting shell in `main.rs`.

pub mod app;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

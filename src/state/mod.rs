//! Client-side session state.
//!
//! DESIGN
//! ======
//! `token_store` is the dumb persistence layer for the bearer token and the
//! cached user; `session` owns the live state machine built on top of it.

pub mod session;
pub mod token_store;

#[cfg(test)]
pub mod test_helpers;

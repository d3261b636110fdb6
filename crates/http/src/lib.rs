//! # sheetsync-http
//!
//! Transport layer for sheetsync.
//!
//! This crate provides the authenticated request executor used to reach the
//! remote spreadsheet API, its configuration, and the decoder for the error
//! envelope the API embeds in response bodies.

/// Client configuration and scope constants.
pub mod config;
/// In-body error envelope decoding.
pub mod envelope;
/// Request executor trait and its `reqwest` implementation.
pub mod executor;

pub use config::ClientConfig;
pub use envelope::{check_error, decode};
pub use executor::{HttpExecutor, RequestExecutor};

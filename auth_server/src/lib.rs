//! HTTP front end for cookie-session authentication.
//!
//! Exposes the router and configuration so integration tests can drive the
//! service in-process.

pub mod api;
pub mod config;
pub mod logging;

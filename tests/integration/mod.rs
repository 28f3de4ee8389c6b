//! CLI integration tests
//!
//! Each test runs the real `ziprepo` binary with its configuration
//! directory isolated under a temp dir. Network-facing tests point
//! `api_url` at a wiremock server.

pub mod cli;
pub mod common;
pub mod upload;

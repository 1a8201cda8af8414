//! gitbuild
//!
//! A GitHub App webhook gateway that authenticates deliveries and launches
//! containerized build jobs, plus the build-side credential provider that
//! exchanges an installation id for a token and fetches the repository archive.

pub mod auth;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod security;
pub mod server;
pub mod webhook;

#[cfg(test)]
mod testutil;

//! # Agon application library
//!
//! Shared between the `agon` binary and the integration tests:
//! - `api`: axum HTTP server over the archive
//! - `authoring`: record construction (the "upstream" collaborator)
//! - `cli`: clap command definitions and implementations
//! - `config`: optional `agon.toml` configuration file

pub mod api;
pub mod authoring;
pub mod cli;
pub mod config;

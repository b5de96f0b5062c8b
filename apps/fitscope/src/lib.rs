//! # fitscope
//!
//! HTTP server and CLI around `fitscope-core`.
//!
//! - [`api`]: axum router, handlers, JSON types, middleware
//! - [`cli`]: clap commands
//! - [`config`]: TOML + environment configuration
//! - [`loader`]: JSON catalog and fit files

pub mod api;
pub mod cli;
pub mod config;
pub mod loader;

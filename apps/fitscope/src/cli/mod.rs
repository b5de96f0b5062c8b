//! # fitscope CLI Module
//!
//! This module implements the CLI interface for fitscope.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show catalog and store sizes
//! - `search` - Autocomplete search over the catalog
//! - `fits` - Faceted fit query
//! - `fit` - Show one fit with charges split out
//! - `ingest` - Load fits from a JSON file into the database
//! - `init` - Initialize a new database

mod commands;

use crate::config::{Backend, Config};
use clap::{Parser, Subcommand};
use fitscope_core::FitscopeError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// fitscope - faceted search over recorded ship fits
#[derive(Parser, Debug)]
#[command(name = "fitscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the JSON catalog
    #[arg(short = 'C', long, global = true)]
    pub catalog: Option<PathBuf>,

    /// Path to the fit database
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show catalog and store sizes
    Status,

    /// Search catalog names
    Search {
        /// Search term (at least 3 characters)
        term: String,
    },

    /// Query fits by facets
    Fits {
        /// Ship item id
        #[arg(short, long)]
        ship: Option<i64>,

        /// Item id every fit must contain (repeatable)
        #[arg(short, long)]
        item: Vec<i64>,

        /// Group id of which every fit must contain a member (repeatable)
        #[arg(short, long)]
        group: Vec<i64>,

        /// Print the equivalent SQL and parameters instead of running the query
        #[arg(long)]
        sql: bool,
    },

    /// Show a single fit
    Fit {
        /// Fit id
        id: Option<String>,
    },

    /// Ingest fits from a JSON file
    Ingest {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Initialize a new empty database
    Init {
        /// Recreate the database if it already exists
        #[arg(short, long)]
        force: bool,
    },
}

// =============================================================================
// SETTINGS
// =============================================================================

impl Cli {
    /// Resolve the effective configuration: file, then environment, then flags.
    pub fn settings(&self) -> Result<Config, FitscopeError> {
        let mut config = Config::load(self.config.as_deref())?;
        config.apply_env();
        if let Some(catalog) = &self.catalog {
            config.data.catalog.clone_from(catalog);
        }
        if let Some(database) = &self.database {
            config.data.database.clone_from(database);
        }
        if let Some(backend) = self.backend {
            config.data.backend = backend;
        }
        Ok(config)
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), FitscopeError> {
    let mut config = cli.settings()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_server(config).await
        }
        Some(Commands::Status) => cmd_status(&config, json_mode),
        Some(Commands::Search { term }) => cmd_search(&config, json_mode, &term),
        Some(Commands::Fits {
            ship,
            item,
            group,
            sql,
        }) => {
            let selection = fitscope_core::FacetSelection {
                ship,
                items: item,
                groups: group,
            };
            cmd_fits(&config, json_mode, &selection, sql)
        }
        Some(Commands::Fit { id }) => cmd_fit(&config, json_mode, id.as_deref()),
        Some(Commands::Ingest { file }) => cmd_ingest(&config, json_mode, &file),
        Some(Commands::Init { force }) => cmd_init(&config, force),
        None => {
            // No subcommand - show status by default
            cmd_status(&config, json_mode)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api::{self, FitDetailJson, FitsResponse, SearchResponse};
use crate::config::{Backend, Config};
use crate::loader;
use fitscope_core::{
    Catalog, Engine, FacetSelection, FitStore, FitscopeError, MemoryStore, Param, RedbStore,
    build_filter, matcher, primitives::MAX_INGEST_BATCH,
};
use std::path::Path;
use std::sync::Arc;

/// Maximum file size for ingestion (100 MB).
const MAX_INGEST_FILE_SIZE: u64 = 100 * 1024 * 1024;

fn render_json<T: serde::Serialize>(value: &T) -> Result<String, FitscopeError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| FitscopeError::Serialization(format!("JSON output: {}", e)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), FitscopeError> {
    println!("{}", render_json(value)?);
    Ok(())
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: Config) -> Result<(), FitscopeError> {
    let engine = open_engine(&config)?;

    println!("fitscope Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Address:  {}", config.bind_addr());
    println!("  Backend:  {}", config.data.backend.as_str());
    println!("  Catalog:  {:?}", config.data.catalog);
    println!("  Database: {:?}", config.data.database);
    println!("  Timeout:  {}s", config.server.request_timeout_secs);
    println!();
    println!("Endpoints:");
    println!("  GET /fits   - Query fits by ship, item and group");
    println!("  GET /fit    - Show one fit");
    println!("  GET /search - Search catalog names");
    println!("  GET /status - Catalog and store sizes");
    println!("  GET /health - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(engine, &config.server).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show catalog and store sizes.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), FitscopeError> {
    let engine = open_engine(config)?;
    let catalog = engine.catalog();
    let fits = engine.fit_count()?;

    if json_mode {
        let output = serde_json::json!({
            "catalog": config.data.catalog.to_string_lossy(),
            "database": config.data.database.to_string_lossy(),
            "backend": config.data.backend.as_str(),
            "items": catalog.item_count(),
            "groups": catalog.group_count(),
            "fits": fits
        });
        return print_json(&output);
    }

    println!("fitscope Status");
    println!("===============");
    println!("Catalog:  {:?}", config.data.catalog);
    println!("Database: {:?}", config.data.database);
    println!("Backend:  {}", config.data.backend.as_str());
    println!();
    println!("Items:  {}", catalog.item_count());
    println!("Groups: {}", catalog.group_count());
    println!("Fits:   {}", fits);

    Ok(())
}

// =============================================================================
// SEARCH COMMAND
// =============================================================================

/// Search catalog names. Only the catalog is loaded.
pub fn cmd_search(config: &Config, json_mode: bool, term: &str) -> Result<(), FitscopeError> {
    let catalog = loader::load_catalog(&config.data.catalog)?;
    let results = matcher::search(&catalog, term);

    if json_mode {
        return print_json(&SearchResponse::from(&results));
    }

    if results.results.is_empty() {
        println!("No matches for '{}'", results.search);
        return Ok(());
    }
    for hit in &results.results {
        println!("{:<6} {:>8}  {}", hit.kind, hit.id, hit.name);
    }
    Ok(())
}

// =============================================================================
// FITS COMMAND
// =============================================================================

/// Run a faceted query, or print its SQL rendering.
pub fn cmd_fits(
    config: &Config,
    json_mode: bool,
    selection: &FacetSelection,
    sql: bool,
) -> Result<(), FitscopeError> {
    if sql {
        let catalog = loader::load_catalog(&config.data.catalog)?;
        return print_sql(&catalog, selection, json_mode);
    }

    let engine = open_engine(config)?;
    let result = engine.query(selection)?;

    if json_mode {
        return print_json(&FitsResponse::from(&result));
    }

    for (kind, entries) in result.filter.iter() {
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        println!("{}: {}", kind.as_str(), names.join(", "));
    }
    println!("{} fit(s)", result.fits.len());
    for fit in &result.fits {
        println!(
            "{:>12}  {:<24} {:>16} ISK  hi:{} med:{} lo:{}",
            fit.id.0,
            fit.name,
            fit.cost,
            fit.hi.len(),
            fit.med.len(),
            fit.lo.len()
        );
    }
    Ok(())
}

fn print_sql(
    catalog: &Catalog,
    selection: &FacetSelection,
    json_mode: bool,
) -> Result<(), FitscopeError> {
    let planned = build_filter(catalog, selection);
    let sql = planned.filter.to_sql();
    let params: Vec<serde_json::Value> = planned
        .filter
        .params()
        .iter()
        .map(|param| match param {
            Param::Item(id) => serde_json::json!(id.0),
            Param::Items(ids) => serde_json::json!(ids.iter().map(|i| i.0).collect::<Vec<_>>()),
        })
        .collect();

    if json_mode {
        return print_json(&serde_json::json!({ "sql": sql, "params": params }));
    }

    println!("{}", sql);
    for (i, param) in params.iter().enumerate() {
        println!("  ${} = {}", i + 1, param);
    }
    Ok(())
}

// =============================================================================
// FIT COMMAND
// =============================================================================

/// Show one fit.
pub fn cmd_fit(config: &Config, json_mode: bool, id: Option<&str>) -> Result<(), FitscopeError> {
    let engine = open_engine(config)?;
    let fit = engine.resolve_fit(id)?;

    if json_mode {
        return print_json(&FitDetailJson::from(&fit));
    }

    let ship = fit.ship.as_ref().map_or("<unknown hull>", |s| s.name.as_str());
    println!("Fit {} - {} ({} ISK)", fit.id, ship, fit.cost);
    let racks = [
        ("High", &fit.hi),
        ("Medium", &fit.med),
        ("Low", &fit.low),
        ("Rig", &fit.rig),
        ("Subsystem", &fit.sub),
    ];
    for (label, rack) in racks {
        if rack.modules.is_empty() {
            continue;
        }
        println!("{}:", label);
        for module in &rack.modules {
            println!("  {}", module.name);
        }
    }
    let charges: Vec<&str> = fit.charges().map(|c| c.name.as_str()).collect();
    if !charges.is_empty() {
        println!("Charges:");
        for name in charges {
            println!("  {}", name);
        }
    }
    Ok(())
}

// =============================================================================
// INGEST COMMAND
// =============================================================================

/// Load fits from a JSON file into the redb database.
///
/// Records are written in transactions of at most `MAX_INGEST_BATCH` fits;
/// existing ids are overwritten.
pub fn cmd_ingest(config: &Config, json_mode: bool, file: &Path) -> Result<(), FitscopeError> {
    if config.data.backend != Backend::Redb {
        return Err(FitscopeError::InvalidInput(
            "ingest requires the redb backend".to_string(),
        ));
    }

    let validated = loader::validate_input_file(file, MAX_INGEST_FILE_SIZE)?;
    tracing::info!("Ingesting fits from {:?}", validated);
    let fits = loader::load_fits(&validated)?;

    let mut store = RedbStore::open(&config.data.database)?;
    let mut written = 0usize;
    for chunk in fits.chunks(MAX_INGEST_BATCH) {
        written += store.insert_batch(chunk)?;
        tracing::debug!("Committed {} fits", written);
    }
    let total = store.len()?;

    if json_mode {
        return print_json(&serde_json::json!({
            "success": true,
            "ingested": written,
            "total": total
        }));
    }
    println!("Ingested {} fit(s); database now holds {}", written, total);
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(config: &Config, force: bool) -> Result<(), FitscopeError> {
    let db_path = &config.data.database;
    if config.data.backend != Backend::Redb {
        return Err(FitscopeError::InvalidInput(
            "init requires the redb backend".to_string(),
        ));
    }

    if db_path.exists() {
        if !force {
            return Err(FitscopeError::InvalidInput(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| FitscopeError::Io(format!("Remove {:?}: {}", db_path, e)))?;
    }

    RedbStore::open(db_path)?;
    println!("Initialized new redb database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load the catalog and open the configured store.
pub fn open_engine(config: &Config) -> Result<Engine, FitscopeError> {
    let catalog = Arc::new(loader::load_catalog(&config.data.catalog)?);

    match config.data.backend {
        Backend::Redb => {
            let store = RedbStore::open(&config.data.database)?;
            Ok(Engine::new(catalog, store))
        }
        Backend::Memory => {
            let store: MemoryStore = match &config.data.fits {
                Some(path) => loader::load_fits(path)?.into_iter().collect(),
                None => MemoryStore::new(),
            };
            tracing::info!("Memory store holds {} fits", store.len()?);
            Ok(Engine::new(catalog, store))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

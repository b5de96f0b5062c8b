//! # Data Loaders
//!
//! Reads the catalog and fit records from JSON files.
//!
//! Catalog format:
//!
//! ```json
//! {
//!   "groups": [{ "id": 25, "name": "Frigate", "category": 6 }],
//!   "items":  [{ "id": 587, "name": "Rifter", "group": 25 }]
//! }
//! ```
//!
//! Fits format: a JSON array of records
//! `{ "id", "ship", "cost", "hi", "med", "low", "rig", "sub" }`; slot lists
//! may be omitted.

use fitscope_core::{
    Catalog, CategoryId, CategoryPolicy, FitRecord, FitscopeError, Group, GroupId, Item, ItemId,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Maximum catalog file size (256 MB).
const MAX_CATALOG_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Maximum fits file size (100 MB).
const MAX_FITS_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    groups: Vec<GroupRecord>,
    #[serde(default)]
    items: Vec<ItemRecord>,
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    id: u32,
    name: String,
    category: u32,
}

#[derive(Debug, Deserialize)]
struct ItemRecord {
    id: u32,
    name: String,
    group: u32,
}

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Resolve `path` to a regular file no larger than `max_size`.
pub fn validate_input_file(path: &Path, max_size: u64) -> Result<PathBuf, FitscopeError> {
    let canonical = path.canonicalize().map_err(|e| {
        FitscopeError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(FitscopeError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| FitscopeError::Io(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > max_size {
        return Err(FitscopeError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }

    Ok(canonical)
}

// =============================================================================
// CATALOG
// =============================================================================

/// Load the catalog from a JSON file.
pub fn load_catalog(path: &Path) -> Result<Catalog, FitscopeError> {
    let path = validate_input_file(path, MAX_CATALOG_FILE_SIZE)?;
    let data = std::fs::read(&path)
        .map_err(|e| FitscopeError::Io(format!("Read catalog: {}", e)))?;
    let catalog = parse_catalog(&data)?;
    tracing::info!(
        items = catalog.item_count(),
        groups = catalog.group_count(),
        "Loaded catalog from {}",
        path.display()
    );
    Ok(catalog)
}

/// Build a catalog from JSON bytes with the default category policy.
///
/// Items whose group is absent are kept; they resolve by id but never
/// surface in searches.
pub fn parse_catalog(data: &[u8]) -> Result<Catalog, FitscopeError> {
    let file: CatalogFile = serde_json::from_slice(data)
        .map_err(|e| FitscopeError::Serialization(format!("Invalid catalog: {}", e)))?;

    let mut builder = Catalog::builder();
    for group in file.groups {
        builder.add_group(Group::new(
            GroupId(group.id),
            group.name,
            CategoryId(group.category),
        ));
    }
    for item in file.items {
        builder.add_item(Item::new(ItemId(item.id), item.name, GroupId(item.group)));
    }

    let orphans = builder.orphan_items();
    if !orphans.is_empty() {
        tracing::warn!(
            count = orphans.len(),
            first = %orphans[0],
            "Catalog items reference unknown groups"
        );
    }

    Ok(builder.build(CategoryPolicy::default()))
}

// =============================================================================
// FITS
// =============================================================================

/// Load fit records from a JSON file.
pub fn load_fits(path: &Path) -> Result<Vec<FitRecord>, FitscopeError> {
    let path = validate_input_file(path, MAX_FITS_FILE_SIZE)?;
    let data =
        std::fs::read(&path).map_err(|e| FitscopeError::Io(format!("Read fits: {}", e)))?;
    parse_fits(&data)
}

/// Decode a JSON array of fit records.
pub fn parse_fits(data: &[u8]) -> Result<Vec<FitRecord>, FitscopeError> {
    serde_json::from_slice(data)
        .map_err(|e| FitscopeError::Serialization(format!("Invalid fits: {}", e)))
}

// =============================================================================
// TESTS
// =============================================================================

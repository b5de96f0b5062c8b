//! # Engine
//!
//! The three operations exposed to the HTTP and CLI layers:
//! - `query`: facet selection -> filter echo + classified fits
//! - `search`: raw term -> normalized term + catalog hits
//! - `resolve_fit`: fit id -> fully resolved fit
//!
//! The engine owns no mutable state. The catalog is shared through an `Arc`
//! and the store is only read, so one engine serves every request. Store
//! errors are returned as-is; nothing is retried here.

use crate::classifier::{self, ClassifiedFit, ResolvedFit};
use crate::matcher::{self, SearchResults};
use crate::predicate::{FacetSelection, FilterEcho, build_filter};
use crate::store::FitStore;
use crate::{Catalog, FitId, FitscopeError};
use std::sync::Arc;

/// Result of a faceted query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitsResult {
    pub filter: FilterEcho,
    pub fits: Vec<ClassifiedFit>,
}

/// Catalog + store, ready to answer requests.
pub struct Engine {
    catalog: Arc<Catalog>,
    store: Box<dyn FitStore + Send + Sync>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("items", &self.catalog.item_count())
            .field("groups", &self.catalog.group_count())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine over a loaded catalog and a store.
    pub fn new(catalog: Arc<Catalog>, store: impl FitStore + Send + Sync + 'static) -> Self {
        Self {
            catalog,
            store: Box::new(store),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Number of fits in the store.
    pub fn fit_count(&self) -> Result<usize, FitscopeError> {
        self.store.len()
    }

    /// Run a faceted query.
    ///
    /// An empty selection returns the newest fits unfiltered.
    pub fn query(&self, selection: &FacetSelection) -> Result<FitsResult, FitscopeError> {
        let planned = build_filter(&self.catalog, selection);
        let rows = self.store.select(&planned.filter)?;
        let fits = rows
            .iter()
            .map(|row| classifier::classify(&self.catalog, row))
            .collect();
        Ok(FitsResult {
            filter: planned.echo,
            fits,
        })
    }

    /// Autocomplete search over the catalog.
    #[must_use]
    pub fn search(&self, raw: &str) -> SearchResults {
        matcher::search(&self.catalog, raw)
    }

    /// Resolve a single fit from a raw id parameter.
    ///
    /// A missing or malformed id is rejected before the store is touched.
    pub fn resolve_fit(&self, raw: Option<&str>) -> Result<ResolvedFit, FitscopeError> {
        let id = parse_fit_id(raw)?;
        let record = self.store.get(id)?.ok_or(FitscopeError::NotFound(id))?;
        Ok(classifier::resolve(&self.catalog, &record))
    }
}

/// Validate a raw fit id parameter.
pub fn parse_fit_id(raw: Option<&str>) -> Result<FitId, FitscopeError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FitscopeError::InvalidInput("missing fit id".to_string()))?;
    raw.parse::<i64>()
        .ok()
        .and_then(FitId::from_raw)
        .ok_or_else(|| FitscopeError::InvalidInput(format!("invalid fit id: {raw}")))
}

// =============================================================================
// TESTS
// =============================================================================

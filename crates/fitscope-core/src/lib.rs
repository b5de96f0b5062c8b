//! # fitscope-core
//!
//! The faceted fit search engine for fitscope - THE LOGIC.
//!
//! Given an immutable catalog of items and groups and a store of recorded
//! fits, this crate:
//! - builds filters over fits from user facets (ship, items, groups)
//! - resolves stored item ids into catalog records
//! - drops consumable charges from slot listings
//! - answers autocomplete searches over item and group names
//!
//! ## Architectural Constraints
//!
//! - No async, no network dependencies (pure Rust)
//! - The catalog is built once and never mutated; share it with `Arc`
//! - Filters are a clause tree, independent of any store driver
//! - Empty results are outcomes, not errors

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod matcher;
pub mod predicate;
pub mod primitives;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CategoryId, FitId, FitRecord, FitscopeError, Group, GroupId, Item, ItemId};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::{Catalog, CatalogBuilder, CategoryPolicy};
pub use classifier::{ClassifiedFit, ResolvedFit, SlotContents};
pub use engine::{Engine, FitsResult};
pub use matcher::{SearchHit, SearchResults, SearchTerm};
pub use predicate::{
    Clause, EchoEntry, FacetKind, FacetSelection, FilterEcho, FitFilter, Param, ParamRef,
    PlannedQuery, build_filter,
};
pub use store::{FitStore, MemoryStore, RedbStore};

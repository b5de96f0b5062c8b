//! # Engine Primitives
//!
//! Fixed limits and default policy tables for the fitscope engine.
//!
//! The limits are part of the public contract of the query and search
//! operations. The policy tables are only defaults: a catalog can be built
//! with any `CategoryPolicy`.

/// Maximum number of fits returned by a faceted query.
pub const MAX_FITS: usize = 100;

/// Minimum length of a normalized search term.
///
/// Shorter terms yield an empty result list, not an error.
pub const MIN_SEARCH_TERM_LENGTH: usize = 3;

/// Entity scanning stops once the accumulated result count exceeds this.
///
/// Group matches are never truncated.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Category of ship hulls.
pub const CATEGORY_SHIP: u32 = 6;

/// Category of fittable modules.
pub const CATEGORY_MODULE: u32 = 7;

/// Category of charges (ammunition, scripts, cap boosters).
pub const CATEGORY_CHARGE: u32 = 8;

/// Category of strategic cruiser subsystems.
pub const CATEGORY_SUBSYSTEM: u32 = 32;

/// Default category to search-result type tag table.
pub const DEFAULT_TYPE_TAGS: &[(u32, &str)] = &[
    (CATEGORY_SHIP, "ship"),
    (CATEGORY_MODULE, "item"),
    (CATEGORY_CHARGE, "item"),
    (CATEGORY_SUBSYSTEM, "item"),
];

/// Default set of categories whose groups are loaded into modules rather
/// than fitted.
pub const DEFAULT_CONSUMABLE_CATEGORIES: &[u32] = &[CATEGORY_CHARGE];

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum number of fits accepted by a single ingest batch.
pub const MAX_INGEST_BATCH: usize = 100_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charges_are_searchable_but_consumable() {
        assert!(
            DEFAULT_TYPE_TAGS
                .iter()
                .any(|(cat, tag)| *cat == CATEGORY_CHARGE && *tag == "item")
        );
        assert!(DEFAULT_CONSUMABLE_CATEGORIES.contains(&CATEGORY_CHARGE));
    }

    #[test]
    fn result_limits() {
        assert_eq!(MAX_FITS, 100);
        assert_eq!(MAX_SEARCH_RESULTS, 50);
        assert_eq!(MIN_SEARCH_TERM_LENGTH, 3);
    }
}

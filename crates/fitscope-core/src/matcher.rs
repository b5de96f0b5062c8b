//! # Match Index
//!
//! Autocomplete search over the catalog.
//!
//! A term matches a candidate name when the name contains the whole term, or
//! contains every whitespace-separated subterm in any order. Groups are
//! scanned first and never truncated; items are scanned next and the scan
//! stops once the accumulated result count exceeds `MAX_SEARCH_RESULTS`.

use crate::Catalog;
use crate::primitives::{MAX_SEARCH_RESULTS, MIN_SEARCH_TERM_LENGTH};
use serde::{Deserialize, Serialize};

/// Result tag for group matches.
pub const GROUP_TAG: &str = "group";

// =============================================================================
// SEARCH TERM
// =============================================================================

/// A normalized (trimmed, lowercased) search term and its subterms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
    fields: Vec<String>,
}

impl SearchTerm {
    /// Normalize a raw term.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim().to_lowercase();
        let fields = text.split_whitespace().map(str::to_string).collect();
        Self { text, fields }
    }

    /// The normalized term.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the term is long enough to be searched.
    #[must_use]
    pub fn is_searchable(&self) -> bool {
        self.text.chars().count() >= MIN_SEARCH_TERM_LENGTH
    }

    /// Two-tier match against an already-lowercased candidate.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        candidate.contains(self.text.as_str())
            || self.fields.iter().all(|f| candidate.contains(f.as_str()))
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// `"group"` or the type tag of the item's category.
    pub kind: String,
    pub name: String,
    pub id: u32,
}

/// The normalized term echoed back with its hits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub search: String,
    pub results: Vec<SearchHit>,
}

// =============================================================================
// SEARCH
// =============================================================================

/// Search the catalog for a raw term.
///
/// Terms shorter than `MIN_SEARCH_TERM_LENGTH` after normalization return
/// no hits without scanning the catalog.
#[must_use]
pub fn search(catalog: &Catalog, raw: &str) -> SearchResults {
    let term = SearchTerm::parse(raw);
    let mut results = Vec::new();

    if !term.is_searchable() {
        return SearchResults {
            search: term.text,
            results,
        };
    }

    for group in catalog.groups() {
        if term.matches(&group.lower) {
            results.push(SearchHit {
                kind: GROUP_TAG.to_string(),
                name: group.name.clone(),
                id: group.id.0,
            });
        }
    }

    for item in catalog.items() {
        if !term.matches(&item.lower) {
            continue;
        }
        if let Some(tag) = catalog.item_type_tag(item) {
            results.push(SearchHit {
                kind: tag.to_string(),
                name: item.name.clone(),
                id: item.id.0,
            });
        }
        if results.len() > MAX_SEARCH_RESULTS {
            break;
        }
    }

    SearchResults {
        search: term.text,
        results,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CategoryId, CategoryPolicy, Group, GroupId, Item, ItemId};

    fn catalog() -> Catalog {
        let mut builder = Catalog::builder();
        builder
            .add_group(Group::new(GroupId(25), "Frigate", CategoryId(6)))
            .add_group(Group::new(GroupId(46), "Propulsion Module", CategoryId(7)))
            .add_group(Group::new(GroupId(9), "Warp Core Blueprint", CategoryId(9)))
            .add_item(Item::new(ItemId(587), "Rifter", GroupId(25)))
            .add_item(Item::new(ItemId(439), "1MN Afterburner II", GroupId(46)))
            .add_item(Item::new(ItemId(440), "Warp Core Stabilizer I", GroupId(46)))
            .add_item(Item::new(ItemId(441), "Core Warp Booster", GroupId(46)))
            .add_item(Item::new(ItemId(900), "Warp Core Stabilizer I Blueprint", GroupId(9)));
        builder.build(CategoryPolicy::default())
    }

    #[test]
    fn phrase_and_any_order_matches() {
        let term = SearchTerm::parse("  Warp Core ");
        assert_eq!(term.as_str(), "warp core");
        assert!(term.matches("warp core stabilizer"));
        assert!(term.matches("core warp booster"));
        assert!(!term.matches("warp"));
        assert!(!term.matches("warp drive"));
    }

    #[test]
    fn short_terms_return_nothing() {
        let results = search(&catalog(), "  Ri ");
        assert_eq!(results.search, "ri");
        assert!(results.results.is_empty());
    }

    #[test]
    fn groups_come_first() {
        let results = search(&catalog(), "prop");
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].kind, "group");
        assert_eq!(results.results[0].id, 46);
    }

    #[test]
    fn untagged_categories_are_excluded() {
        let results = search(&catalog(), "warp core");
        let ids: Vec<u32> = results.results.iter().map(|h| h.id).collect();
        // group 9 matches by name, item 900 sits in an untagged category
        assert_eq!(ids, vec![9, 440, 441]);
        assert!(results.results[1..].iter().all(|h| h.kind == "item"));
    }

    #[test]
    fn ship_hits_are_tagged_ship() {
        let results = search(&catalog(), "RIFTER");
        assert_eq!(results.results.len(), 1);
        assert_eq!(results.results[0].kind, "ship");
        assert_eq!(results.results[0].name, "Rifter");
    }

    #[test]
    fn item_scan_stops_after_cap() {
        let mut builder = Catalog::builder();
        builder.add_group(Group::new(GroupId(1), "Hybrid Weapon", CategoryId(7)));
        for i in 0..200 {
            builder.add_item(Item::new(ItemId(1000 + i), format!("Blaster {i}"), GroupId(1)));
        }
        let catalog = builder.build(CategoryPolicy::default());

        let results = search(&catalog, "blaster");
        assert_eq!(results.results.len(), MAX_SEARCH_RESULTS + 1);
    }

    #[test]
    fn group_hits_are_never_truncated() {
        let mut builder = Catalog::builder();
        for i in 0..80 {
            let name = format!("Laser Group {i}");
            builder.add_group(Group::new(GroupId(i + 1), name, CategoryId(7)));
        }
        builder.add_item(Item::new(ItemId(1), "Laser One", GroupId(1)));
        builder.add_item(Item::new(ItemId(2), "Laser Two", GroupId(1)));
        let catalog = builder.build(CategoryPolicy::default());

        let results = search(&catalog, "laser");
        let groups = results.results.iter().filter(|h| h.kind == "group").count();
        let items = results.results.len() - groups;
        assert_eq!(groups, 80);
        assert_eq!(items, 1);
    }
}

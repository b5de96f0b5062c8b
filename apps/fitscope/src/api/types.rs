//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! The data endpoints (`/fits`, `/fit`, `/search`) use PascalCase field
//! names with `ID` for identifiers, as existing clients expect. Operational
//! endpoints use snake_case.

use fitscope_core::{
    ClassifiedFit, FacetSelection, FilterEcho, FitsResult, Item, ResolvedFit, SearchHit,
    SearchResults,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// QUERY PARAMETERS
// =============================================================================

/// First value of `key` in raw query pairs. Later repeats are ignored.
#[must_use]
pub fn first_param<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, value)| value.as_str())
}

/// Parse a facet integer; anything unparseable becomes 0, which the
/// predicate builder ignores.
fn facet_int(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

/// Build a facet selection from raw `/fits` query pairs.
///
/// `ship` takes the first value given; `item` and `group` keep every value
/// in order.
#[must_use]
pub fn selection_from_pairs(pairs: &[(String, String)]) -> FacetSelection {
    let mut selection = FacetSelection::new();
    for (key, value) in pairs {
        match key.as_str() {
            "ship" if selection.ship.is_none() => selection.ship = Some(facet_int(value)),
            "item" => selection.items.push(facet_int(value)),
            "group" => selection.groups.push(facet_int(value)),
            _ => {}
        }
    }
    selection
}

// =============================================================================
// SHARED
// =============================================================================

/// A catalog item as rendered by the data endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemJson {
    #[serde(rename = "ID")]
    pub id: u32,
    pub name: String,
    pub group: u32,
}

impl From<&Item> for ItemJson {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.0,
            name: item.name.clone(),
            group: item.group.0,
        }
    }
}

fn items_json(items: &[Item]) -> Vec<ItemJson> {
    items.iter().map(ItemJson::from).collect()
}

/// A resolved facet in the filter echo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EchoJson {
    #[serde(rename = "ID")]
    pub id: u32,
    pub name: String,
}

// =============================================================================
// FITS RESPONSE
// =============================================================================

/// One row of a `/fits` listing. Charges are already dropped from the slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FitSummaryJson {
    pub killmail: u64,
    pub ship: u32,
    pub name: String,
    pub cost: i64,
    pub hi: Vec<ItemJson>,
    pub med: Vec<ItemJson>,
    pub lo: Vec<ItemJson>,
}

impl From<&ClassifiedFit> for FitSummaryJson {
    fn from(fit: &ClassifiedFit) -> Self {
        Self {
            killmail: fit.id.0,
            ship: fit.ship.0,
            name: fit.name.clone(),
            cost: fit.cost,
            hi: items_json(&fit.hi),
            med: items_json(&fit.med),
            lo: items_json(&fit.lo),
        }
    }
}

/// `/fits` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FitsResponse {
    /// Facet kind (`ship`, `item`, `group`) to the facets that resolved.
    pub filter: BTreeMap<String, Vec<EchoJson>>,
    pub fits: Vec<FitSummaryJson>,
}

fn filter_json(echo: &FilterEcho) -> BTreeMap<String, Vec<EchoJson>> {
    echo.iter()
        .map(|(kind, entries)| {
            let entries = entries
                .iter()
                .map(|e| EchoJson {
                    id: e.id,
                    name: e.name.clone(),
                })
                .collect();
            (kind.as_str().to_string(), entries)
        })
        .collect()
}

impl From<&FitsResult> for FitsResponse {
    fn from(result: &FitsResult) -> Self {
        Self {
            filter: filter_json(&result.filter),
            fits: result.fits.iter().map(FitSummaryJson::from).collect(),
        }
    }
}

// =============================================================================
// FIT RESPONSE
// =============================================================================

/// `/fit` response: every slot with charges listed separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FitDetailJson {
    pub killmail: u64,
    pub cost: i64,
    pub ship: Option<ItemJson>,
    pub hi: Vec<ItemJson>,
    pub med: Vec<ItemJson>,
    pub low: Vec<ItemJson>,
    pub rig: Vec<ItemJson>,
    pub sub: Vec<ItemJson>,
    pub charges: Vec<ItemJson>,
}

impl From<&ResolvedFit> for FitDetailJson {
    fn from(fit: &ResolvedFit) -> Self {
        Self {
            killmail: fit.id.0,
            cost: fit.cost,
            ship: fit.ship.as_ref().map(ItemJson::from),
            hi: items_json(&fit.hi.modules),
            med: items_json(&fit.med.modules),
            low: items_json(&fit.low.modules),
            rig: items_json(&fit.rig.modules),
            sub: items_json(&fit.sub.modules),
            charges: fit.charges().map(ItemJson::from).collect(),
        }
    }
}

// =============================================================================
// SEARCH RESPONSE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchHitJson {
    #[serde(rename = "Type")]
    pub kind: String,
    pub name: String,
    #[serde(rename = "ID")]
    pub id: u32,
}

impl From<&SearchHit> for SearchHitJson {
    fn from(hit: &SearchHit) -> Self {
        Self {
            kind: hit.kind.clone(),
            name: hit.name.clone(),
            id: hit.id,
        }
    }
}

/// `/search` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SearchResponse {
    pub search: String,
    pub results: Vec<SearchHitJson>,
}

impl From<&SearchResults> for SearchResponse {
    fn from(results: &SearchResults) -> Self {
        Self {
            search: results.search.clone(),
            results: results.results.iter().map(SearchHitJson::from).collect(),
        }
    }
}

// =============================================================================
// HEALTH / STATUS / ERROR
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Catalog and store sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub items: usize,
    pub groups: usize,
    pub fits: usize,
}

/// Error body for every non-2xx response produced by a handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn repeated_params_are_collected_in_order() {
        let selection = selection_from_pairs(&pairs(&[
            ("item", "3"),
            ("ship", "587"),
            ("group", "25"),
            ("item", "1"),
            ("ship", "603"),
            ("page", "2"),
        ]));
        assert_eq!(selection.ship, Some(587));
        assert_eq!(selection.items, vec![3, 1]);
        assert_eq!(selection.groups, vec![25]);
    }

    #[test]
    fn first_param_ignores_repeats() {
        let raw = pairs(&[("term", "laser"), ("id", "7"), ("term", "beam")]);
        assert_eq!(first_param(&raw, "term"), Some("laser"));
        assert_eq!(first_param(&raw, "id"), Some("7"));
        assert_eq!(first_param(&raw, "ship"), None);
    }

    #[test]
    fn unparseable_values_become_zero() {
        let selection = selection_from_pairs(&pairs(&[("ship", "rifter"), ("item", "")]));
        assert_eq!(selection.ship, Some(0));
        assert_eq!(selection.items, vec![0]);
    }

    #[test]
    fn search_hit_uses_pascal_case_names() {
        let hit = SearchHitJson {
            kind: "item".to_string(),
            name: "EMP S".to_string(),
            id: 200,
        };
        let value = serde_json::to_value(&hit).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"Type": "item", "Name": "EMP S", "ID": 200})
        );
    }
}

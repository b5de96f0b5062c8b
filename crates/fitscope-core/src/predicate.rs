//! # Predicate Module
//!
//! Translates a user's facet selection into a filter over stored fits.
//!
//! - One clause per non-empty facet, all ANDed against a `TRUE` base
//! - Parameters are positional and bound in clause order
//! - The result is a small clause tree; executors either evaluate it
//!   (`FitFilter::matches`) or render it for a SQL driver (`FitFilter::to_sql`)
//! - Alongside the filter, a `FilterEcho` records the catalog records each
//!   facet resolved to, so callers can show what was searched for

use crate::primitives::MAX_FITS;
use crate::{Catalog, GroupId, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

// =============================================================================
// FACET SELECTION
// =============================================================================

/// The facets chosen for one request.
///
/// Values are kept raw: anything `<= 0` is ignored when the filter is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSelection {
    /// Primary entity (ship hull).
    pub ship: Option<i64>,
    /// Component entities that must all be present. Order and duplicates kept.
    pub items: Vec<i64>,
    /// Groups of which at least one member must be present, per group.
    pub groups: Vec<i64>,
}

impl FacetSelection {
    /// An empty selection (most recent fits, unfiltered).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary entity.
    #[must_use]
    pub fn with_ship(mut self, ship: i64) -> Self {
        self.ship = Some(ship);
        self
    }

    /// Append a component entity.
    #[must_use]
    pub fn with_item(mut self, item: i64) -> Self {
        self.items.push(item);
        self
    }

    /// Append a group.
    #[must_use]
    pub fn with_group(mut self, group: i64) -> Self {
        self.groups.push(group);
        self
    }
}

// =============================================================================
// FILTER ECHO
// =============================================================================

/// Facet dimension, used as the key of a `FilterEcho`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetKind {
    Ship,
    Item,
    Group,
}

impl FacetKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ship => "ship",
            Self::Item => "item",
            Self::Group => "group",
        }
    }
}

/// A catalog record a facet resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EchoEntry {
    pub id: u32,
    pub name: String,
}

/// Per-facet list of the catalog records that were matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterEcho(BTreeMap<FacetKind, Vec<EchoEntry>>);

impl FilterEcho {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolved entry under a facet.
    pub fn push(&mut self, kind: FacetKind, entry: EchoEntry) {
        self.0.entry(kind).or_default().push(entry);
    }

    /// Entries recorded for a facet.
    #[must_use]
    pub fn get(&self, kind: FacetKind) -> &[EchoEntry] {
        self.0.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate facets in `ship`, `item`, `group` order.
    pub fn iter(&self) -> impl Iterator<Item = (FacetKind, &[EchoEntry])> {
        self.0.iter().map(|(k, v)| (*k, v.as_slice()))
    }
}

// =============================================================================
// CLAUSE TREE
// =============================================================================

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Item(ItemId),
    Items(Vec<ItemId>),
}

/// Index into `FitFilter::params`. Rendered as `$index+1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ParamRef(pub usize);

/// One conjunct of a fit filter, tested against a fit's component set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// The component set contains the referenced item.
    Contains(ParamRef),
    /// The component set contains every item of the referenced array.
    ContainsAll(ParamRef),
    /// The component set contains at least one referenced item.
    /// Empty means always false.
    AnyOf(Vec<ParamRef>),
}

/// Filter over stored fits: conjunction of clauses, newest first, bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitFilter {
    clauses: Vec<Clause>,
    params: Vec<Param>,
    limit: usize,
}

impl Default for FitFilter {
    fn default() -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
            limit: MAX_FITS,
        }
    }
}

impl FitFilter {
    /// The base filter: every fit, newest first, at most `MAX_FITS`.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    fn bind(&mut self, param: Param) -> ParamRef {
        self.params.push(param);
        ParamRef(self.params.len() - 1)
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Maximum number of fits to return.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    #[must_use]
    pub fn param(&self, r: ParamRef) -> Option<&Param> {
        self.params.get(r.0)
    }

    /// Evaluate the filter against a fit's component set.
    #[must_use]
    pub fn matches(&self, components: &BTreeSet<ItemId>) -> bool {
        let contained = |r: &ParamRef| match self.param(*r) {
            Some(Param::Item(id)) => components.contains(id),
            Some(Param::Items(ids)) => ids.iter().all(|id| components.contains(id)),
            None => false,
        };

        self.clauses.iter().all(|clause| match clause {
            Clause::Contains(r) | Clause::ContainsAll(r) => contained(r),
            Clause::AnyOf(refs) => refs.iter().any(contained),
        })
    }

    /// Render as a PostgreSQL query over a `fits` table whose `items` column
    /// is a JSONB array of component ids. Parameters bind as `$1..$n` in
    /// `params()` order.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut sql =
            String::from("SELECT killmail, ship, cost, hi, med, low FROM fits WHERE TRUE");
        for clause in &self.clauses {
            match clause {
                Clause::Contains(r) => {
                    let _ = write!(sql, " AND items @> ${}", r.0 + 1);
                }
                Clause::ContainsAll(r) => {
                    let _ = write!(sql, " AND items @> array_to_json(${}::int[])::jsonb", r.0 + 1);
                }
                Clause::AnyOf(refs) if refs.is_empty() => sql.push_str(" AND FALSE"),
                Clause::AnyOf(refs) => {
                    let terms: Vec<String> =
                        refs.iter().map(|r| format!("items @> ${}", r.0 + 1)).collect();
                    let _ = write!(sql, " AND ({})", terms.join(" OR "));
                }
            }
        }
        let _ = write!(sql, " ORDER BY killmail DESC LIMIT {}", self.limit);
        sql
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// A built filter together with its echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub filter: FitFilter,
    pub echo: FilterEcho,
}

/// Build the filter and echo for a facet selection.
///
/// Rules, each independent:
/// 1. `ship > 0`: one `Contains` clause, echoed under `ship`.
/// 2. `items > 0`: one `ContainsAll` clause over all of them, each echoed
///    under `item`.
/// 3. each `group > 0`: one `AnyOf` clause over the group's catalog members,
///    echoed under `group`. A group without members filters everything out.
///
/// Ids unknown to the catalog still constrain the filter but are not echoed.
#[must_use]
pub fn build_filter(catalog: &Catalog, selection: &FacetSelection) -> PlannedQuery {
    let mut filter = FitFilter::all();
    let mut echo = FilterEcho::new();

    if let Some(ship) = selection.ship.and_then(ItemId::from_raw) {
        let r = filter.bind(Param::Item(ship));
        filter.clauses.push(Clause::Contains(r));
        if let Some(item) = catalog.item(ship) {
            echo.push(
                FacetKind::Ship,
                EchoEntry {
                    id: item.id.0,
                    name: item.name.clone(),
                },
            );
        }
    }

    let items: Vec<ItemId> = selection
        .items
        .iter()
        .filter_map(|raw| ItemId::from_raw(*raw))
        .collect();
    for id in &items {
        if let Some(item) = catalog.item(*id) {
            echo.push(
                FacetKind::Item,
                EchoEntry {
                    id: item.id.0,
                    name: item.name.clone(),
                },
            );
        }
    }
    if !items.is_empty() {
        let r = filter.bind(Param::Items(items));
        filter.clauses.push(Clause::ContainsAll(r));
    }

    for gid in selection.groups.iter().filter_map(|raw| GroupId::from_raw(*raw)) {
        let refs = catalog
            .group_members(gid)
            .iter()
            .map(|member| filter.bind(Param::Item(*member)))
            .collect();
        filter.clauses.push(Clause::AnyOf(refs));
        if let Some(group) = catalog.group(gid) {
            echo.push(
                FacetKind::Group,
                EchoEntry {
                    id: group.id.0,
                    name: group.name.clone(),
                },
            );
        }
    }

    PlannedQuery { filter, echo }
}

// =============================================================================
// TESTS
// =============================================================================

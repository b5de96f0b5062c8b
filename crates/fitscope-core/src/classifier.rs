//! # Result Classifier
//!
//! Resolves the raw slot ids of stored fits through the catalog.
//!
//! Items whose group is consumable are charges loaded into a module, not
//! modules themselves: they are dropped from slot listings and, in the
//! single-fit view, reported separately. Ids the catalog does not know are
//! skipped silently.

use crate::{Catalog, FitId, FitRecord, Item, ItemId};
use serde::{Deserialize, Serialize};

// =============================================================================
// SLOT RESOLUTION
// =============================================================================

/// Modules and charges of one slot rack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotContents {
    pub modules: Vec<Item>,
    pub charges: Vec<Item>,
}

/// Resolve a slot rack, keeping only non-consumable items.
#[must_use]
pub fn resolve_slot(catalog: &Catalog, ids: &[ItemId]) -> Vec<Item> {
    ids.iter()
        .filter_map(|id| catalog.item(*id))
        .filter(|item| !catalog.is_consumable_group(item.group))
        .cloned()
        .collect()
}

/// Resolve a slot rack, separating modules from charges.
#[must_use]
pub fn split_slot(catalog: &Catalog, ids: &[ItemId]) -> SlotContents {
    let mut contents = SlotContents::default();
    for item in ids.iter().filter_map(|id| catalog.item(*id)) {
        if catalog.is_consumable_group(item.group) {
            contents.charges.push(item.clone());
        } else {
            contents.modules.push(item.clone());
        }
    }
    contents
}

// =============================================================================
// LISTING VIEW
// =============================================================================

/// A fit as shown in query listings: ship plus high/medium/low modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFit {
    pub id: FitId,
    pub ship: ItemId,
    /// Ship name, empty when the hull is not in the catalog.
    pub name: String,
    pub cost: i64,
    pub hi: Vec<Item>,
    pub med: Vec<Item>,
    pub lo: Vec<Item>,
}

/// Classify a stored fit for listings.
#[must_use]
pub fn classify(catalog: &Catalog, fit: &FitRecord) -> ClassifiedFit {
    ClassifiedFit {
        id: fit.id,
        ship: fit.ship,
        name: catalog
            .item(fit.ship)
            .map(|item| item.name.clone())
            .unwrap_or_default(),
        cost: fit.cost,
        hi: resolve_slot(catalog, &fit.hi),
        med: resolve_slot(catalog, &fit.med),
        lo: resolve_slot(catalog, &fit.low),
    }
}

// =============================================================================
// SINGLE-FIT VIEW
// =============================================================================

/// A fully resolved fit: every rack split into modules and charges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFit {
    pub id: FitId,
    pub ship: Option<Item>,
    pub cost: i64,
    pub hi: SlotContents,
    pub med: SlotContents,
    pub low: SlotContents,
    pub rig: SlotContents,
    pub sub: SlotContents,
}

impl ResolvedFit {
    /// All charges across every rack, in rack order.
    pub fn charges(&self) -> impl Iterator<Item = &Item> {
        [&self.hi, &self.med, &self.low, &self.rig, &self.sub]
            .into_iter()
            .flat_map(|slot| slot.charges.iter())
    }
}

/// Resolve every rack of a stored fit.
#[must_use]
pub fn resolve(catalog: &Catalog, fit: &FitRecord) -> ResolvedFit {
    ResolvedFit {
        id: fit.id,
        ship: catalog.item(fit.ship).cloned(),
        cost: fit.cost,
        hi: split_slot(catalog, &fit.hi),
        med: split_slot(catalog, &fit.med),
        low: split_slot(catalog, &fit.low),
        rig: split_slot(catalog, &fit.rig),
        sub: split_slot(catalog, &fit.sub),
    }
}

// =============================================================================
// TESTS
// =============================================================================

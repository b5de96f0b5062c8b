//! # Core Type Definitions
//!
//! This module contains the shared types of the fitscope engine:
//! - Identifiers (`ItemId`, `GroupId`, `CategoryId`, `FitId`)
//! - Catalog records (`Item`, `Group`)
//! - Stored configurations (`FitRecord`)
//! - Error types (`FitscopeError`)
//!
//! ## Ordering Guarantees
//!
//! All identifiers implement `Ord` so catalogs and stores can keep them in
//! `BTreeMap`/`BTreeSet` and iterate deterministically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a catalog item (a ship hull, a module, a charge...).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct ItemId(pub u32);

/// Identifier of a catalog group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct GroupId(pub u32);

/// Coarse classification code of a group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct CategoryId(pub u32);

/// Identifier of a stored fit (the killmail it was recorded from).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct FitId(pub u64);

impl ItemId {
    /// Interpret a raw request value. Non-positive or out-of-range values are absent.
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        positive_u32(raw).map(Self)
    }
}

impl GroupId {
    /// Interpret a raw request value. Non-positive or out-of-range values are absent.
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        positive_u32(raw).map(Self)
    }
}

impl FitId {
    /// Interpret a raw request value. Non-positive values are absent.
    #[must_use]
    pub fn from_raw(raw: i64) -> Option<Self> {
        u64::try_from(raw).ok().filter(|v| *v > 0).map(Self)
    }
}

fn positive_u32(raw: i64) -> Option<u32> {
    u32::try_from(raw).ok().filter(|v| *v > 0)
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CATALOG RECORDS
// =============================================================================

/// A catalog item.
///
/// `lower` is computed once at construction and used by the match index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub lower: String,
    pub group: GroupId,
}

impl Item {
    /// Create an item, precomputing its lowercase name.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, group: GroupId) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        Self {
            id,
            name,
            lower,
            group,
        }
    }
}

/// A catalog group.
///
/// `consumable` is derived from the category when the catalog is built;
/// groups constructed by hand start out non-consumable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub lower: String,
    pub category: CategoryId,
    pub consumable: bool,
}

impl Group {
    /// Create a group, precomputing its lowercase name.
    #[must_use]
    pub fn new(id: GroupId, name: impl Into<String>, category: CategoryId) -> Self {
        let name = name.into();
        let lower = name.to_lowercase();
        Self {
            id,
            name,
            lower,
            category,
            consumable: false,
        }
    }
}

// =============================================================================
// STORED FIT
// =============================================================================

/// A fit as recorded in the store.
///
/// Slot lists keep the order and duplicates of the source record; charges
/// loaded into modules appear in the same lists as the modules themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FitRecord {
    pub id: FitId,
    pub ship: ItemId,
    pub cost: i64,
    #[serde(default)]
    pub hi: Vec<ItemId>,
    #[serde(default)]
    pub med: Vec<ItemId>,
    #[serde(default)]
    pub low: Vec<ItemId>,
    #[serde(default)]
    pub rig: Vec<ItemId>,
    #[serde(default)]
    pub sub: Vec<ItemId>,
}

impl FitRecord {
    /// Create a fit with empty slots.
    #[must_use]
    pub fn new(id: FitId, ship: ItemId, cost: i64) -> Self {
        Self {
            id,
            ship,
            cost,
            ..Self::default()
        }
    }

    /// The searchable component set: the ship plus every slotted item.
    #[must_use]
    pub fn components(&self) -> BTreeSet<ItemId> {
        std::iter::once(self.ship)
            .chain(self.hi.iter().copied())
            .chain(self.med.iter().copied())
            .chain(self.low.iter().copied())
            .chain(self.rig.iter().copied())
            .chain(self.sub.iter().copied())
            .collect()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors surfaced by the fitscope engine.
///
/// Zero matches, short search terms, unknown catalog ids and empty groups are
/// normal outcomes and never reach this type.
#[derive(Debug, Error)]
pub enum FitscopeError {
    /// The referenced fit is not in the store.
    #[error("Fit not found: {0}")]
    NotFound(FitId),

    /// A required parameter is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The store executor failed.
    #[error("Store error: {0}")]
    Store(String),

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_ids_must_be_positive() {
        assert_eq!(ItemId::from_raw(0), None);
        assert_eq!(ItemId::from_raw(-5), None);
        assert_eq!(ItemId::from_raw(587), Some(ItemId(587)));
        assert_eq!(GroupId::from_raw(i64::MAX), None);
        assert_eq!(FitId::from_raw(-1), None);
        assert_eq!(FitId::from_raw(72_000_001), Some(FitId(72_000_001)));
    }

    #[test]
    fn item_precomputes_lowercase_name() {
        let item = Item::new(ItemId(2048), "Damage Control II", GroupId(60));
        assert_eq!(item.lower, "damage control ii");
        assert_eq!(item.name, "Damage Control II");
    }

    #[test]
    fn components_include_ship_and_all_slots() {
        let mut fit = FitRecord::new(FitId(1), ItemId(587), 1_000);
        fit.hi = vec![ItemId(10), ItemId(10)];
        fit.low = vec![ItemId(20)];
        fit.rig = vec![ItemId(30)];

        let components: Vec<_> = fit.components().into_iter().collect();
        assert_eq!(
            components,
            vec![ItemId(10), ItemId(20), ItemId(30), ItemId(587)]
        );
    }

    #[test]
    fn error_messages_name_the_fit() {
        let err = FitscopeError::NotFound(FitId(42));
        assert_eq!(err.to_string(), "Fit not found: 42");
    }
}

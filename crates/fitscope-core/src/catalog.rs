//! # Catalog
//!
//! The immutable item/group catalog shared by every request.
//!
//! A `Catalog` is assembled once through `CatalogBuilder` and never mutated
//! afterwards, so it can be wrapped in an `Arc` and read from any number of
//! tasks without locking. All lookups are pure; a missing key is a normal
//! outcome (`None`), never an error.

use crate::primitives::{DEFAULT_CONSUMABLE_CATEGORIES, DEFAULT_TYPE_TAGS};
use crate::{CategoryId, Group, GroupId, Item, ItemId};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// CATEGORY POLICY
// =============================================================================

/// Static classification tables applied to group categories.
///
/// - `type_tags`: which categories surface in search results, and under
///   which tag (`"ship"`, `"item"`).
/// - `consumable`: categories whose groups are charges loaded into modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPolicy {
    type_tags: BTreeMap<CategoryId, String>,
    consumable: BTreeSet<CategoryId>,
}

impl CategoryPolicy {
    /// Create a policy from explicit tables.
    #[must_use]
    pub fn new(
        type_tags: impl IntoIterator<Item = (CategoryId, String)>,
        consumable: impl IntoIterator<Item = CategoryId>,
    ) -> Self {
        Self {
            type_tags: type_tags.into_iter().collect(),
            consumable: consumable.into_iter().collect(),
        }
    }

    /// The search type tag of a category, if it is user-facing.
    #[must_use]
    pub fn type_tag(&self, category: CategoryId) -> Option<&str> {
        self.type_tags.get(&category).map(String::as_str)
    }

    /// Whether groups of this category hold consumables.
    #[must_use]
    pub fn is_consumable(&self, category: CategoryId) -> bool {
        self.consumable.contains(&category)
    }
}

impl Default for CategoryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_TYPE_TAGS
                .iter()
                .map(|(cat, tag)| (CategoryId(*cat), (*tag).to_string())),
            DEFAULT_CONSUMABLE_CATEGORIES.iter().map(|c| CategoryId(*c)),
        )
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Read-only snapshot of every known item and group.
///
/// Iteration over items and groups is in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<ItemId, Item>,
    groups: BTreeMap<GroupId, Group>,
    /// GroupId -> member ItemIds, ascending.
    members: BTreeMap<GroupId, Vec<ItemId>>,
    policy: CategoryPolicy,
}

impl Catalog {
    /// Start assembling a catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Lookup an item by id.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Lookup a group by id.
    #[must_use]
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// True iff the group exists and its category is consumable.
    #[must_use]
    pub fn is_consumable_group(&self, id: GroupId) -> bool {
        self.groups.get(&id).is_some_and(|g| g.consumable)
    }

    /// Every item whose owning group is `id`, ascending.
    ///
    /// Items are indexed by the group id they carry, whether or not that
    /// group itself is present in the catalog.
    #[must_use]
    pub fn group_members(&self, id: GroupId) -> &[ItemId] {
        self.members.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The search type tag for a category.
    #[must_use]
    pub fn type_tag(&self, category: CategoryId) -> Option<&str> {
        self.policy.type_tag(category)
    }

    /// The search type tag of an item, through its group's category.
    #[must_use]
    pub fn item_type_tag(&self, item: &Item) -> Option<&str> {
        self.group(item.group)
            .and_then(|g| self.policy.type_tag(g.category))
    }

    /// All items in ascending id order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// All groups in ascending id order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// Number of items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// The classification tables this catalog was built with.
    #[must_use]
    pub fn policy(&self) -> &CategoryPolicy {
        &self.policy
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Accumulates records for a `Catalog`.
///
/// Later insertions with the same id replace earlier ones. No referential
/// checks are made; the loader owns catalog integrity.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    items: BTreeMap<ItemId, Item>,
    groups: BTreeMap<GroupId, Group>,
}

impl CatalogBuilder {
    /// Add or replace a group.
    pub fn add_group(&mut self, group: Group) -> &mut Self {
        self.groups.insert(group.id, group);
        self
    }

    /// Add or replace an item.
    pub fn add_item(&mut self, item: Item) -> &mut Self {
        self.items.insert(item.id, item);
        self
    }

    /// Items whose group is not part of the builder.
    #[must_use]
    pub fn orphan_items(&self) -> Vec<ItemId> {
        self.items
            .values()
            .filter(|item| !self.groups.contains_key(&item.group))
            .map(|item| item.id)
            .collect()
    }

    /// Freeze the builder into a catalog, deriving consumable flags and the
    /// group membership index.
    #[must_use]
    pub fn build(self, policy: CategoryPolicy) -> Catalog {
        let mut groups = self.groups;
        for group in groups.values_mut() {
            group.consumable = policy.is_consumable(group.category);
        }

        let mut members: BTreeMap<GroupId, Vec<ItemId>> = BTreeMap::new();
        for item in self.items.values() {
            members.entry(item.group).or_default().push(item.id);
        }

        Catalog {
            items: self.items,
            groups,
            members,
            policy,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        let mut builder = Catalog::builder();
        builder
            .add_group(Group::new(GroupId(25), "Frigate", CategoryId(6)))
            .add_group(Group::new(GroupId(83), "Projectile Ammo", CategoryId(8)))
            .add_group(Group::new(GroupId(55), "Projectile Weapon", CategoryId(7)))
            .add_item(Item::new(ItemId(587), "Rifter", GroupId(25)))
            .add_item(Item::new(ItemId(484), "125mm Gatling AutoCannon I", GroupId(55)))
            .add_item(Item::new(ItemId(185), "EMP S", GroupId(83)))
            .add_item(Item::new(ItemId(178), "Carbonized Lead S", GroupId(83)));
        builder.build(CategoryPolicy::default())
    }

    #[test]
    fn lookups_resolve_known_ids() {
        let catalog = sample();
        assert_eq!(catalog.item(ItemId(587)).map(|i| i.name.as_str()), Some("Rifter"));
        assert_eq!(
            catalog.group(GroupId(83)).map(|g| g.category),
            Some(CategoryId(8))
        );
        assert!(catalog.item(ItemId(999)).is_none());
        assert!(catalog.group(GroupId(999)).is_none());
    }

    #[test]
    fn consumable_flag_follows_category() {
        let catalog = sample();
        assert!(catalog.is_consumable_group(GroupId(83)));
        assert!(!catalog.is_consumable_group(GroupId(55)));
        assert!(!catalog.is_consumable_group(GroupId(999)));
    }

    #[test]
    fn lookups_are_stable_across_calls() {
        let catalog = sample();
        for _ in 0..3 {
            assert!(catalog.is_consumable_group(GroupId(83)));
            assert_eq!(catalog.item(ItemId(185)).map(|i| i.group), Some(GroupId(83)));
        }
    }

    #[test]
    fn group_members_are_ascending() {
        let catalog = sample();
        assert_eq!(catalog.group_members(GroupId(83)), &[ItemId(178), ItemId(185)]);
        assert!(catalog.group_members(GroupId(25)).contains(&ItemId(587)));
        assert!(catalog.group_members(GroupId(4242)).is_empty());
    }

    #[test]
    fn item_type_tag_uses_group_category() {
        let catalog = sample();
        let rifter = catalog.item(ItemId(587)).cloned();
        assert_eq!(
            rifter.as_ref().and_then(|i| catalog.item_type_tag(i)),
            Some("ship")
        );
        assert_eq!(catalog.type_tag(CategoryId(4)), None);
    }

    #[test]
    fn custom_policy_changes_classification() {
        let mut builder = Catalog::builder();
        builder.add_group(Group::new(GroupId(1), "Drones", CategoryId(18)));
        let catalog = builder.build(CategoryPolicy::new(
            [(CategoryId(18), "drone".to_string())],
            [CategoryId(18)],
        ));
        assert!(catalog.is_consumable_group(GroupId(1)));
        assert_eq!(catalog.type_tag(CategoryId(18)), Some("drone"));
        assert_eq!(catalog.type_tag(CategoryId(6)), None);
    }

    #[test]
    fn orphan_items_are_reported() {
        let mut builder = Catalog::builder();
        builder
            .add_group(Group::new(GroupId(1), "Frigate", CategoryId(6)))
            .add_item(Item::new(ItemId(10), "Atron", GroupId(1)))
            .add_item(Item::new(ItemId(11), "Mystery", GroupId(2)));
        assert_eq!(builder.orphan_items(), vec![ItemId(11)]);
    }
}

//! # Engine Integration Tests
//!
//! End-to-end checks of query, search and resolve over both executors,
//! using a small synthetic catalog.

use fitscope_core::{
    Catalog, CategoryId, CategoryPolicy, Engine, FacetKind, FacetSelection, FitId, FitRecord,
    FitStore, FitscopeError, Group, GroupId, Item, ItemId, MemoryStore, RedbStore,
};
use std::sync::Arc;
use tempfile::tempdir;

const RIFTER: u32 = 587;
const SLASHER: u32 = 585;
const AUTOCANNON: u32 = 100;
const EMP_S: u32 = 200;
const DAMAGE_CONTROL: u32 = 2048;
const WARP_CORE_STAB: u32 = 10998;

fn catalog() -> Arc<Catalog> {
    let mut builder = Catalog::builder();
    builder
        .add_group(Group::new(GroupId(25), "Frigate", CategoryId(6)))
        .add_group(Group::new(GroupId(55), "Projectile Weapon", CategoryId(7)))
        .add_group(Group::new(GroupId(60), "Damage Control", CategoryId(7)))
        .add_group(Group::new(GroupId(83), "Projectile Ammo", CategoryId(8)))
        .add_group(Group::new(GroupId(315), "Warp Core Stabilizer", CategoryId(7)))
        .add_group(Group::new(GroupId(999), "Unused Group", CategoryId(7)))
        .add_item(Item::new(ItemId(RIFTER), "Rifter", GroupId(25)))
        .add_item(Item::new(ItemId(SLASHER), "Slasher", GroupId(25)))
        .add_item(Item::new(ItemId(AUTOCANNON), "200mm AutoCannon I", GroupId(55)))
        .add_item(Item::new(ItemId(EMP_S), "EMP S", GroupId(83)))
        .add_item(Item::new(ItemId(DAMAGE_CONTROL), "Damage Control II", GroupId(60)))
        .add_item(Item::new(ItemId(WARP_CORE_STAB), "Warp Core Stabilizer I", GroupId(315)));
    Arc::new(builder.build(CategoryPolicy::default()))
}

fn fits() -> Vec<FitRecord> {
    let mut a = FitRecord::new(FitId(1), ItemId(RIFTER), 5_000_000);
    a.hi = vec![ItemId(AUTOCANNON), ItemId(EMP_S)];
    a.low = vec![ItemId(DAMAGE_CONTROL)];

    let mut b = FitRecord::new(FitId(2), ItemId(SLASHER), 3_000_000);
    b.hi = vec![ItemId(AUTOCANNON)];
    b.low = vec![ItemId(WARP_CORE_STAB)];

    let mut c = FitRecord::new(FitId(3), ItemId(RIFTER), 7_000_000);
    c.low = vec![ItemId(WARP_CORE_STAB), ItemId(DAMAGE_CONTROL)];

    vec![a, b, c]
}

fn memory_engine() -> Engine {
    Engine::new(catalog(), fits().into_iter().collect::<MemoryStore>())
}

fn ids(result: &fitscope_core::FitsResult) -> Vec<u64> {
    result.fits.iter().map(|f| f.id.0).collect()
}

#[test]
fn no_facets_returns_everything_newest_first() {
    let result = memory_engine().query(&FacetSelection::new()).expect("query");
    assert_eq!(ids(&result), vec![3, 2, 1]);
    assert!(result.filter.is_empty());
}

#[test]
fn ship_and_item_facets_combine_with_and() {
    let selection = FacetSelection::new()
        .with_ship(i64::from(RIFTER))
        .with_item(i64::from(DAMAGE_CONTROL));
    let result = memory_engine().query(&selection).expect("query");
    assert_eq!(ids(&result), vec![3, 1]);
    assert_eq!(result.filter.get(FacetKind::Ship)[0].name, "Rifter");
    assert_eq!(result.filter.get(FacetKind::Item)[0].name, "Damage Control II");
}

#[test]
fn items_require_all_listed() {
    let selection = FacetSelection::new()
        .with_item(i64::from(AUTOCANNON))
        .with_item(i64::from(WARP_CORE_STAB));
    let result = memory_engine().query(&selection).expect("query");
    assert_eq!(ids(&result), vec![2]);
}

#[test]
fn groups_require_any_member_per_group() {
    let selection = FacetSelection::new().with_group(25).with_group(315);
    let result = memory_engine().query(&selection).expect("query");
    assert_eq!(ids(&result), vec![3, 2]);
    let groups: Vec<&str> = result
        .filter
        .get(FacetKind::Group)
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    assert_eq!(groups, vec!["Frigate", "Warp Core Stabilizer"]);
}

#[test]
fn memberless_group_returns_no_fits() {
    let selection = FacetSelection::new()
        .with_ship(i64::from(RIFTER))
        .with_group(999);
    let result = memory_engine().query(&selection).expect("query");
    assert!(result.fits.is_empty());
}

#[test]
fn listing_drops_charges_from_slots() {
    let result = memory_engine()
        .query(&FacetSelection::new().with_item(i64::from(EMP_S)))
        .expect("query");
    assert_eq!(ids(&result), vec![1]);
    let hi: Vec<u32> = result.fits[0].hi.iter().map(|i| i.id.0).collect();
    assert_eq!(hi, vec![AUTOCANNON]);
}

#[test]
fn search_finds_groups_then_items() {
    let results = memory_engine().search("Warp Core");
    assert_eq!(results.search, "warp core");
    let tagged: Vec<(&str, u32)> = results
        .results
        .iter()
        .map(|h| (h.kind.as_str(), h.id))
        .collect();
    assert_eq!(tagged, vec![("group", 315), ("item", WARP_CORE_STAB)]);
}

#[test]
fn resolve_reports_not_found_and_invalid_input() {
    let engine = memory_engine();
    assert!(matches!(
        engine.resolve_fit(Some("77")),
        Err(FitscopeError::NotFound(FitId(77)))
    ));
    assert!(matches!(
        engine.resolve_fit(None),
        Err(FitscopeError::InvalidInput(_))
    ));
}

#[test]
fn redb_engine_matches_memory_engine() {
    let dir = tempdir().expect("tempdir");
    let mut store = RedbStore::open(dir.path().join("fits.redb")).expect("open");
    store.insert_batch(&fits()).expect("batch");
    let redb_engine = Engine::new(catalog(), store);
    let memory_engine = memory_engine();

    let selections = [
        FacetSelection::new(),
        FacetSelection::new().with_ship(i64::from(RIFTER)),
        FacetSelection::new().with_item(i64::from(AUTOCANNON)),
        FacetSelection::new().with_group(55).with_group(60),
        FacetSelection::new().with_group(999),
    ];
    for selection in &selections {
        assert_eq!(
            redb_engine.query(selection).expect("redb query"),
            memory_engine.query(selection).expect("memory query"),
        );
    }

    let resolved = redb_engine.resolve_fit(Some("1")).expect("resolve");
    assert_eq!(resolved.hi.charges.len(), 1);
    assert_eq!(resolved.low.modules.len(), 1);
    assert_eq!(redb_engine.fit_count().expect("count"), 3);
}

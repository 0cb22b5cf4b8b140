mod common;

use common::{distance_policy, POLICY_ID, RATE_ID, UNIT_ID};
use reimburse_rate::policy::{
    CustomUnitPatch, CustomUnitRatePatch, DistanceUnit, InMemoryPolicyStore, PendingAction,
    PolicyStore, StoreCall, UnitAttributes,
};

fn km_patch() -> CustomUnitPatch {
    CustomUnitPatch {
        attributes: Some(UnitAttributes {
            unit: Some(DistanceUnit::Kilometers),
        }),
        ..Default::default()
    }
}

#[test]
fn every_write_publishes_a_new_revision() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    assert_eq!(store.snapshot().units_revision, 0);

    store.open_reimburse_view(POLICY_ID);
    assert_eq!(store.snapshot().units_revision, 1);

    store.replace_policy(distance_policy(100.0, DistanceUnit::Miles));
    assert_eq!(store.snapshot().units_revision, 2);
}

#[test]
fn subscribers_see_published_snapshots() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    let mut rx = store.subscribe();
    assert!(!rx.has_changed().unwrap());

    store.replace_policy(distance_policy(300.0, DistanceUnit::Miles));
    assert!(rx.has_changed().unwrap());
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.policy.custom_units[UNIT_ID].rates[RATE_ID].rate, 300.0);
}

#[test]
fn unit_patch_merges_over_existing_unit() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    let current = store.policy().custom_units[UNIT_ID].clone();

    store.update_custom_unit(POLICY_ID, &current, km_patch());

    let policy = store.policy();
    let unit = &policy.custom_units[UNIT_ID];
    assert_eq!(unit.attributes.unit, Some(DistanceUnit::Kilometers));
    assert_eq!(unit.name, "Distance");
    assert_eq!(unit.rates.len(), 1);
    assert_eq!(unit.pending_action, None);
}

#[test]
fn rate_patch_merges_over_stored_entry() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    let current = store.policy().custom_units[UNIT_ID].rates[RATE_ID].clone();

    store.update_custom_unit_rate(
        POLICY_ID,
        Some(&current),
        UNIT_ID,
        CustomUnitRatePatch::with_rate(Some(&current), 275.0),
    );

    let rate = store.policy().custom_units[UNIT_ID].rates[RATE_ID].clone();
    assert_eq!(rate.rate, 275.0);
    assert_eq!(rate.name, "Default Rate");
}

#[test]
fn rate_update_for_unknown_unit_is_ignored() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    let before = store.snapshot().units_revision;

    store.update_custom_unit_rate(
        POLICY_ID,
        None,
        "missing-unit",
        CustomUnitRatePatch::with_rate(None, 500.0),
    );

    assert_eq!(store.snapshot().units_revision, before);
    assert_eq!(store.calls().len(), 1);
}

#[test]
fn write_for_other_policy_is_ignored() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    let current = store.policy().custom_units[UNIT_ID].clone();

    store.update_custom_unit("other-policy", &current, km_patch());

    assert_eq!(store.snapshot().units_revision, 0);
    assert_eq!(
        store.policy().custom_units[UNIT_ID].attributes.unit,
        Some(DistanceUnit::Miles)
    );
}

#[test]
fn offline_writes_stay_pending_until_refetch() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    let current = store.policy().custom_units[UNIT_ID].clone();
    store.set_offline(true);

    store.update_custom_unit(POLICY_ID, &current, km_patch());
    assert_eq!(
        store.policy().custom_units[UNIT_ID].pending_action,
        Some(PendingAction::Update)
    );

    // Fetching while offline does not confirm anything.
    store.open_reimburse_view(POLICY_ID);
    assert_eq!(
        store.policy().custom_units[UNIT_ID].pending_action,
        Some(PendingAction::Update)
    );

    store.set_offline(false);
    store.open_reimburse_view(POLICY_ID);
    let policy = store.policy();
    let unit = &policy.custom_units[UNIT_ID];
    assert_eq!(unit.pending_action, None);
    assert_eq!(unit.attributes.unit, Some(DistanceUnit::Kilometers));
}

#[test]
fn failing_writes_attach_errors() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    let current = store.policy().custom_units[UNIT_ID].clone();
    store.fail_updates_with(Some("Unit locked".to_string()));

    store.update_custom_unit(POLICY_ID, &current, km_patch());
    store.update_custom_unit(POLICY_ID, &current, km_patch());

    let policy = store.policy();
    let unit = &policy.custom_units[UNIT_ID];
    assert_eq!(unit.attributes.unit, Some(DistanceUnit::Miles));
    assert_eq!(unit.errors.len(), 2);

    store.clear_custom_unit_errors(POLICY_ID, UNIT_ID, RATE_ID);
    assert!(store.policy().custom_units[UNIT_ID].errors.is_empty());
}

#[test]
fn take_calls_drains_the_log() {
    let store = InMemoryPolicyStore::new(distance_policy(100.0, DistanceUnit::Miles));
    store.open_reimburse_view(POLICY_ID);

    assert_eq!(
        store.take_calls(),
        vec![StoreCall::OpenReimburseView {
            policy_id: POLICY_ID.to_string()
        }]
    );
    assert!(store.calls().is_empty());
}

//! Shared fixtures for the reimbursement tests.

#![allow(dead_code, unused_imports)]

use std::collections::BTreeMap;
use std::sync::Arc;

use reimburse_rate::policy::{
    CustomUnit, CustomUnitRate, DistanceUnit, InMemoryPolicyStore, Policy, UnitAttributes,
    CUSTOM_UNIT_NAME_DISTANCE, DEFAULT_RATE_NAME,
};
use reimburse_rate::sync::{RateSyncController, SyncSettings};

pub const POLICY_ID: &str = "policy-1";
pub const UNIT_ID: &str = "unit-1";
pub const RATE_ID: &str = "rate-1";

/// Policy with a distance unit and a default rate of `rate`.
pub fn distance_policy(rate: f64, unit: DistanceUnit) -> Policy {
    let mut rates = BTreeMap::new();
    rates.insert(
        RATE_ID.to_string(),
        CustomUnitRate {
            custom_unit_rate_id: RATE_ID.to_string(),
            name: DEFAULT_RATE_NAME.to_string(),
            rate,
            ..Default::default()
        },
    );

    let mut custom_units = BTreeMap::new();
    custom_units.insert(
        UNIT_ID.to_string(),
        CustomUnit {
            custom_unit_id: UNIT_ID.to_string(),
            name: CUSTOM_UNIT_NAME_DISTANCE.to_string(),
            attributes: UnitAttributes { unit: Some(unit) },
            rates,
            ..Default::default()
        },
    );

    Policy {
        id: POLICY_ID.to_string(),
        output_currency: "USD".to_string(),
        has_vba: false,
        custom_units,
    }
}

/// Policy without any custom units.
pub fn bare_policy() -> Policy {
    Policy {
        id: POLICY_ID.to_string(),
        output_currency: "USD".to_string(),
        ..Default::default()
    }
}

/// Store plus a controller mounted on it with default settings.
pub fn mounted(policy: Policy) -> (Arc<InMemoryPolicyStore>, RateSyncController) {
    mounted_with(policy, SyncSettings::default())
}

pub fn mounted_with(
    policy: Policy,
    settings: SyncSettings,
) -> (Arc<InMemoryPolicyStore>, RateSyncController) {
    let store = Arc::new(InMemoryPolicyStore::new(policy));
    let controller = RateSyncController::mount(store.clone(), &settings).unwrap();
    (store, controller)
}

/// Let spawned tasks run without advancing time.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Rates sent to the store, in call order.
pub fn sent_rates(store: &InMemoryPolicyStore) -> Vec<f64> {
    use reimburse_rate::policy::StoreCall;

    store
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            StoreCall::UpdateCustomUnitRate { patch, .. } => patch.rate,
            _ => None,
        })
        .collect()
}

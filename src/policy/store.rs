//! Policy store collaborator.
//!
//! The [`PolicyStore`] trait is the narrow surface the rate controller
//! depends on. [`InMemoryPolicyStore`] implements it locally: it merges
//! patches, publishes a new snapshot after every change to the custom units
//! and keeps a log of the calls it received.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::policy::types::{
    CustomUnit, CustomUnitPatch, CustomUnitRate, CustomUnitRatePatch, PendingAction, Policy,
};

/// A published view of the policy.
#[derive(Debug, Clone)]
pub struct PolicySnapshot {
    /// Bumped every time the custom units are replaced, even when the new
    /// value is equal to the old one.
    pub units_revision: u64,
    pub policy: Arc<Policy>,
}

/// Operations the reimbursement settings need from the policy store.
///
/// Writes are fire-and-forget: results come back as a new snapshot, with
/// failures attached to the affected entries as errors.
pub trait PolicyStore: Send + Sync {
    /// Latest published snapshot.
    fn snapshot(&self) -> PolicySnapshot;

    /// Receiver that observes every published snapshot.
    fn subscribe(&self) -> watch::Receiver<PolicySnapshot>;

    /// Fetch the policy data the reimbursement view needs.
    fn open_reimburse_view(&self, policy_id: &str);

    /// Merge `patch` into `current` and persist it.
    fn update_custom_unit(&self, policy_id: &str, current: &CustomUnit, patch: CustomUnitPatch);

    /// Merge `patch` into the rate entry of `unit_id` and persist it.
    fn update_custom_unit_rate(
        &self,
        policy_id: &str,
        current: Option<&CustomUnitRate>,
        unit_id: &str,
        patch: CustomUnitRatePatch,
    );

    /// Clear error and pending annotations on a unit and its rate.
    fn clear_custom_unit_errors(&self, policy_id: &str, unit_id: &str, rate_id: &str);
}

/// Record of a call made to [`InMemoryPolicyStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    OpenReimburseView {
        policy_id: String,
    },
    UpdateCustomUnit {
        policy_id: String,
        unit_id: String,
        patch: CustomUnitPatch,
    },
    UpdateCustomUnitRate {
        policy_id: String,
        unit_id: String,
        patch: CustomUnitRatePatch,
    },
    ClearCustomUnitErrors {
        policy_id: String,
        unit_id: String,
        rate_id: String,
    },
}

/// Local policy store backed by memory.
pub struct InMemoryPolicyStore {
    inner: RwLock<StoreInner>,
    tx: watch::Sender<PolicySnapshot>,
}

struct StoreInner {
    snapshot: PolicySnapshot,
    offline: bool,
    failure: Option<String>,
    error_seq: u64,
    calls: Vec<StoreCall>,
}

impl InMemoryPolicyStore {
    pub fn new(policy: Policy) -> Self {
        let snapshot = PolicySnapshot {
            units_revision: 0,
            policy: Arc::new(policy),
        };
        let (tx, _rx) = watch::channel(snapshot.clone());
        Self {
            inner: RwLock::new(StoreInner {
                snapshot,
                offline: false,
                failure: None,
                error_seq: 0,
                calls: Vec::new(),
            }),
            tx,
        }
    }

    /// Current policy value.
    pub fn policy(&self) -> Arc<Policy> {
        Arc::clone(&self.inner.read().snapshot.policy)
    }

    /// Switch offline mode.
    ///
    /// Offline writes are applied optimistically and marked as pending
    /// until the next `open_reimburse_view` made while online.
    pub fn set_offline(&self, offline: bool) {
        self.inner.write().offline = offline;
    }

    /// Make subsequent writes fail with `reason` instead of applying.
    pub fn fail_updates_with(&self, reason: Option<String>) {
        self.inner.write().failure = reason;
    }

    /// Replace the whole policy, as a push from another client would.
    pub fn replace_policy(&self, policy: Policy) {
        let mut inner = self.inner.write();
        self.publish(&mut inner, policy);
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.read().calls.clone()
    }

    /// Drain the call log.
    pub fn take_calls(&self) -> Vec<StoreCall> {
        std::mem::take(&mut self.inner.write().calls)
    }

    fn publish(&self, inner: &mut StoreInner, policy: Policy) {
        inner.snapshot = PolicySnapshot {
            units_revision: inner.snapshot.units_revision + 1,
            policy: Arc::new(policy),
        };
        self.tx.send_replace(inner.snapshot.clone());
    }

    /// Apply `edit` to a copy of the custom units and publish the result.
    ///
    /// Writes for a policy other than the loaded one are dropped.
    fn edit_units<F>(&self, inner: &mut StoreInner, policy_id: &str, edit: F)
    where
        F: FnOnce(&mut BTreeMap<String, CustomUnit>, WriteMode),
    {
        if inner.snapshot.policy.id != policy_id {
            tracing::warn!(
                policy_id = %policy_id,
                loaded = %inner.snapshot.policy.id,
                "Ignoring write for a policy that is not loaded"
            );
            return;
        }

        let mode = match (&inner.failure, inner.offline) {
            (Some(reason), _) => {
                inner.error_seq += 1;
                WriteMode::Fail {
                    key: inner.error_seq.to_string(),
                    reason: reason.clone(),
                }
            }
            (None, true) => WriteMode::Pending,
            (None, false) => WriteMode::Apply,
        };

        let mut policy = (*inner.snapshot.policy).clone();
        edit(&mut policy.custom_units, mode);
        self.publish(inner, policy);
    }
}

/// How a write lands in the store.
enum WriteMode {
    Apply,
    Pending,
    Fail { key: String, reason: String },
}

impl WriteMode {
    fn pending_action(&self) -> Option<PendingAction> {
        match self {
            WriteMode::Pending => Some(PendingAction::Update),
            _ => None,
        }
    }
}

impl PolicyStore for InMemoryPolicyStore {
    fn snapshot(&self) -> PolicySnapshot {
        self.inner.read().snapshot.clone()
    }

    fn subscribe(&self) -> watch::Receiver<PolicySnapshot> {
        self.tx.subscribe()
    }

    fn open_reimburse_view(&self, policy_id: &str) {
        let mut inner = self.inner.write();
        inner.calls.push(StoreCall::OpenReimburseView {
            policy_id: policy_id.to_string(),
        });
        if inner.offline {
            tracing::debug!(policy_id = %policy_id, "Offline, reimburse view fetch deferred");
            return;
        }

        let mut policy = (*inner.snapshot.policy).clone();
        for unit in policy.custom_units.values_mut() {
            unit.pending_action = None;
            for rate in unit.rates.values_mut() {
                rate.pending_action = None;
            }
        }
        self.publish(&mut inner, policy);
    }

    fn update_custom_unit(&self, policy_id: &str, current: &CustomUnit, patch: CustomUnitPatch) {
        let mut inner = self.inner.write();
        let unit_id = patch
            .custom_unit_id
            .clone()
            .unwrap_or_else(|| current.custom_unit_id.clone());
        inner.calls.push(StoreCall::UpdateCustomUnit {
            policy_id: policy_id.to_string(),
            unit_id: unit_id.clone(),
            patch: patch.clone(),
        });

        self.edit_units(&mut inner, policy_id, |units, mode| {
            let base = units.get(&unit_id).cloned().unwrap_or_else(|| current.clone());
            let entry = match mode {
                WriteMode::Fail { key, reason } => {
                    let mut failed = base;
                    failed.errors.insert(key, reason);
                    failed
                }
                ref ok => {
                    let mut merged = patch.merged_into(&base);
                    merged.pending_action = ok.pending_action();
                    merged
                }
            };
            units.insert(unit_id.clone(), entry);
        });
    }

    fn update_custom_unit_rate(
        &self,
        policy_id: &str,
        current: Option<&CustomUnitRate>,
        unit_id: &str,
        patch: CustomUnitRatePatch,
    ) {
        let mut inner = self.inner.write();
        inner.calls.push(StoreCall::UpdateCustomUnitRate {
            policy_id: policy_id.to_string(),
            unit_id: unit_id.to_string(),
            patch: patch.clone(),
        });

        if !inner.snapshot.policy.custom_units.contains_key(unit_id) {
            tracing::warn!(
                policy_id = %policy_id,
                unit_id = %unit_id,
                "Ignoring rate update for an unknown unit"
            );
            return;
        }

        let rate_id = patch
            .custom_unit_rate_id
            .clone()
            .or_else(|| current.map(|r| r.custom_unit_rate_id.clone()))
            .unwrap_or_default();

        self.edit_units(&mut inner, policy_id, |units, mode| {
            let Some(unit) = units.get_mut(unit_id) else {
                return;
            };
            let base = unit
                .rates
                .get(&rate_id)
                .cloned()
                .or_else(|| current.cloned())
                .unwrap_or_default();
            let entry = match mode {
                WriteMode::Fail { key, reason } => {
                    let mut failed = base;
                    failed.errors.insert(key, reason);
                    failed
                }
                ref ok => {
                    let mut merged = patch.merged_into(&base);
                    merged.pending_action = ok.pending_action();
                    merged
                }
            };
            unit.rates.insert(rate_id.clone(), entry);
        });
    }

    fn clear_custom_unit_errors(&self, policy_id: &str, unit_id: &str, rate_id: &str) {
        let mut inner = self.inner.write();
        inner.calls.push(StoreCall::ClearCustomUnitErrors {
            policy_id: policy_id.to_string(),
            unit_id: unit_id.to_string(),
            rate_id: rate_id.to_string(),
        });

        if inner.snapshot.policy.id != policy_id {
            return;
        }
        let mut policy = (*inner.snapshot.policy).clone();
        if let Some(unit) = policy.custom_units.get_mut(unit_id) {
            unit.errors.clear();
            unit.pending_action = None;
            if let Some(rate) = unit.rates.get_mut(rate_id) {
                rate.errors.clear();
                rate.pending_action = None;
            }
        }
        self.publish(&mut inner, policy);
    }
}

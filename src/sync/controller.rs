//! Rate synchronization for the distance reimbursement settings.
//!
//! The controller keeps the rate text the user is editing, validates every
//! keystroke, and sends the settled value to the policy store at most once
//! per debounce window. Snapshots published by the store replace the local
//! state wholesale, including edits that have not been sent yet.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::policy::{
    CustomUnitPatch, CustomUnitRatePatch, DistanceUnit, ErrorFields, PendingAction,
    PolicySnapshot, PolicyStore, UnitAttributes,
};
use crate::rate::{to_numeric, RateFormatError, RateGrammar};
use crate::sync::debounce::Debouncer;
use crate::ui::mvi::Reducer;
use crate::ui::reimburse::{ReimburseIntent, ReimburseReducer, ReimburseState};

/// Keys that send the current rate right away.
pub const FLUSH_KEYS: [&str; 2] = ["ArrowLeft", "ArrowRight"];

/// Default quiet period before a rate edit is sent.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Settings the controller is built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncSettings {
    pub debounce: Duration,
    pub decimal_separator: char,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            decimal_separator: '.',
        }
    }
}

impl From<&Config> for SyncSettings {
    fn from(config: &Config) -> Self {
        Self {
            debounce: Duration::from_millis(config.sync.debounce_ms),
            decimal_separator: config.decimal_separator(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkStatus {
    pub is_offline: bool,
}

/// Store annotations to surface next to the rate field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldFeedback {
    pub errors: ErrorFields,
    pub pending_action: Option<PendingAction>,
}

/// Owns the rate field of one mounted reimbursement view.
pub struct RateSyncController {
    // Declared first so the timer is cancelled before the view goes away.
    debouncer: Debouncer,
    shared: Arc<Shared>,
}

struct Shared {
    store: Arc<dyn PolicyStore>,
    grammar: RateGrammar,
    view: Mutex<View>,
}

struct View {
    state: ReimburseState,
    snapshot: PolicySnapshot,
    network: NetworkStatus,
}

impl RateSyncController {
    /// Seed the state from the store's current snapshot and request a fetch.
    ///
    /// # Errors
    /// Returns an error if the decimal separator cannot be used.
    pub fn mount(
        store: Arc<dyn PolicyStore>,
        settings: &SyncSettings,
    ) -> Result<Self, RateFormatError> {
        let grammar = RateGrammar::new(settings.decimal_separator)?;
        let snapshot = store.snapshot();
        let state = ReimburseReducer::reduce(
            ReimburseState::default(),
            ReimburseIntent::Reconcile {
                policy: Arc::clone(&snapshot.policy),
                separator: grammar.separator(),
            },
        );
        let policy_id = snapshot.policy.id.clone();

        let shared = Arc::new(Shared {
            store,
            grammar,
            view: Mutex::new(View {
                state,
                snapshot,
                network: NetworkStatus::default(),
            }),
        });

        let weak = Arc::downgrade(&shared);
        let debouncer = Debouncer::new(settings.debounce, move || {
            if let Some(shared) = weak.upgrade() {
                shared.commit_current();
            }
        });

        tracing::info!(
            policy_id = %policy_id,
            debounce_ms = settings.debounce.as_millis() as u64,
            "Reimburse view mounted"
        );
        shared.store.open_reimburse_view(&policy_id);

        Ok(Self { debouncer, shared })
    }

    /// Forward store snapshots to [`on_policy_changed`](Self::on_policy_changed).
    ///
    /// The task holds a weak reference and ends when the controller is
    /// dropped or the store closes its channel.
    pub fn listen(self: &Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.shared.store.subscribe();
        let weak = Arc::downgrade(self);

        // Anything published before subscribing is caught up here.
        let current = rx.borrow_and_update().clone();
        self.on_policy_changed(current);

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                let Some(controller) = weak.upgrade() else {
                    break;
                };
                controller.on_policy_changed(snapshot);
            }
        })
    }

    pub fn state(&self) -> ReimburseState {
        self.shared.view.lock().state.clone()
    }

    pub fn policy_id(&self) -> String {
        self.shared.view.lock().snapshot.policy.id.clone()
    }

    pub fn has_pending_commit(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Handle new text in the rate input.
    ///
    /// Text outside the rate grammar is ignored and the previous value kept.
    /// Either way the commit timer restarts.
    pub fn set_rate(&self, input: &str) {
        let grammar = &self.shared.grammar;
        if !grammar.accepts(input) {
            tracing::debug!(input = %input, "Rejected rate input");
        }

        {
            let mut view = self.shared.view.lock();
            let state = std::mem::take(&mut view.state);
            view.state = ReimburseReducer::reduce(
                state,
                ReimburseIntent::EditRate {
                    input: input.to_string(),
                    grammar: grammar.clone(),
                },
            );
        }

        self.debouncer.schedule();
    }

    /// Send the current rate now when the cursor moves sideways.
    pub fn on_key_navigate(&self, key: &str) {
        if !FLUSH_KEYS.contains(&key) {
            return;
        }
        self.debouncer.flush();
    }

    /// Send the rate edit still waiting on the timer, if there is one.
    ///
    /// Call before tearing the controller down so the last edit is not lost.
    /// Returns whether a commit ran.
    pub fn flush_pending(&self) -> bool {
        self.debouncer.flush_pending()
    }

    /// Parse `value` and send it as the new rate.
    ///
    /// Values that do not parse are dropped without contacting the store.
    pub fn commit_rate(&self, value: &str) {
        self.shared.commit(value);
    }

    /// Request a change of the distance unit.
    ///
    /// Local state is left alone; it follows the store's next snapshot.
    pub fn set_unit(&self, unit: DistanceUnit) {
        let (state, policy) = {
            let view = self.shared.view.lock();
            (view.state.clone(), Arc::clone(&view.snapshot.policy))
        };

        if unit == state.unit_value {
            return;
        }

        let Some(distance_unit) = policy.distance_unit() else {
            tracing::warn!(
                policy_id = %policy.id,
                "Policy has no customUnits, returning early"
            );
            return;
        };

        let patch = CustomUnitPatch {
            custom_unit_id: Some(state.unit_id),
            name: Some(state.unit_name),
            attributes: Some(UnitAttributes { unit: Some(unit) }),
        };
        tracing::info!(policy_id = %policy.id, unit = %unit, "Updating distance unit");
        self.shared
            .store
            .update_custom_unit(&policy.id, distance_unit, patch);
    }

    /// Apply a store snapshot. Returns whether the state was rebuilt.
    ///
    /// Only a newer custom-units revision triggers a rebuild; an edit still
    /// waiting on the timer is discarded. Older or repeated revisions are
    /// ignored.
    pub fn on_policy_changed(&self, snapshot: PolicySnapshot) -> bool {
        let units_revision = snapshot.units_revision;
        let outcome = self.debouncer.cancel_if(|| {
            let mut view = self.shared.view.lock();
            if units_revision <= view.snapshot.units_revision {
                return false;
            }

            let state = std::mem::take(&mut view.state);
            view.state = ReimburseReducer::reduce(
                state,
                ReimburseIntent::Reconcile {
                    policy: Arc::clone(&snapshot.policy),
                    separator: self.shared.grammar.separator(),
                },
            );
            view.snapshot = snapshot;
            true
        });

        match outcome {
            None => false,
            Some(discarded) => {
                if discarded {
                    tracing::debug!(units_revision, "Store update replaced an unsent rate edit");
                }
                true
            }
        }
    }

    /// Track connectivity; coming back online refetches the policy.
    pub fn on_network_change(&self, status: NetworkStatus) {
        let (reconnecting, policy_id) = {
            let mut view = self.shared.view.lock();
            let previous = std::mem::replace(&mut view.network, status);
            (
                previous.is_offline && !status.is_offline,
                view.snapshot.policy.id.clone(),
            )
        };

        if !reconnecting {
            return;
        }
        tracing::info!(policy_id = %policy_id, "Reconnected, refreshing reimburse view");
        self.shared.store.open_reimburse_view(&policy_id);
    }

    /// Errors and pending state of the distance unit and its rate.
    ///
    /// Rate errors override unit errors with the same key. The unit's
    /// pending action wins over the rate's.
    pub fn field_feedback(&self) -> FieldFeedback {
        let view = self.shared.view.lock();
        let unit = view
            .snapshot
            .policy
            .custom_units
            .get(&view.state.unit_id);
        let rate = unit.and_then(|u| u.rates.get(&view.state.unit_rate_id));

        let mut errors = unit.map(|u| u.errors.clone()).unwrap_or_default();
        if let Some(rate) = rate {
            errors.extend(rate.errors.clone());
        }

        FieldFeedback {
            errors,
            pending_action: unit
                .and_then(|u| u.pending_action)
                .or_else(|| rate.and_then(|r| r.pending_action)),
        }
    }

    /// Dismiss the errors shown next to the rate field.
    pub fn clear_errors(&self) {
        let (policy_id, unit_id, rate_id) = {
            let view = self.shared.view.lock();
            (
                view.snapshot.policy.id.clone(),
                view.state.unit_id.clone(),
                view.state.unit_rate_id.clone(),
            )
        };
        self.shared
            .store
            .clear_custom_unit_errors(&policy_id, &unit_id, &rate_id);
    }
}

impl Shared {
    fn commit_current(&self) {
        let value = self.view.lock().state.unit_rate_value.clone();
        self.commit(&value);
    }

    fn commit(&self, value: &str) {
        let Some(numeric) = to_numeric(value, self.grammar.separator()) else {
            tracing::debug!(value = %value, "Dropping unparseable rate");
            return;
        };

        let (policy, unit_id, rate_id) = {
            let view = self.view.lock();
            (
                Arc::clone(&view.snapshot.policy),
                view.state.unit_id.clone(),
                view.state.unit_rate_id.clone(),
            )
        };

        let current = policy
            .distance_unit()
            .and_then(|unit| unit.rates.get(&rate_id));
        let rate = numeric.scaled();
        let patch = CustomUnitRatePatch::with_rate(current, rate);

        tracing::info!(
            policy_id = %policy.id,
            unit_id = %unit_id,
            rate_id = %rate_id,
            rate,
            "Committing distance rate"
        );
        self.store
            .update_custom_unit_rate(&policy.id, current, &unit_id, patch);
    }
}

//! Debounced synchronization of the distance rate with the policy store.

mod controller;
mod debounce;

pub use controller::{
    FieldFeedback, NetworkStatus, RateSyncController, SyncSettings, DEFAULT_DEBOUNCE, FLUSH_KEYS,
};
pub use debounce::Debouncer;

//! Workspace policy model and the store collaborator.

mod file;
mod store;
mod types;

pub use file::PolicyFileError;
pub use store::{InMemoryPolicyStore, PolicySnapshot, PolicyStore, StoreCall};
pub use types::{
    CustomUnit, CustomUnitPatch, CustomUnitRate, CustomUnitRatePatch, DistanceUnit, ErrorFields,
    PendingAction, Policy, UnitAttributes, UnknownDistanceUnit, CUSTOM_UNIT_NAME_DISTANCE,
    DEFAULT_RATE_NAME,
};

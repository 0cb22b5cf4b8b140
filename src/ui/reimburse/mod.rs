mod intent;
mod reducer;
mod state;

pub use intent::ReimburseIntent;
pub use reducer::ReimburseReducer;
pub use state::ReimburseState;

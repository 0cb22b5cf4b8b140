use crate::rate::{to_display, DisplaySource};
use crate::ui::mvi::Reducer;
use crate::ui::reimburse::intent::ReimburseIntent;
use crate::ui::reimburse::state::ReimburseState;

pub struct ReimburseReducer;

impl Reducer for ReimburseReducer {
    type State = ReimburseState;
    type Intent = ReimburseIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            ReimburseIntent::Reconcile { policy, separator } => {
                ReimburseState::from_policy(&policy, separator)
            }
            ReimburseIntent::EditRate { input, grammar } => {
                if !grammar.accepts(&input) {
                    // Keep the last valid text
                    return state;
                }
                ReimburseState {
                    unit_rate_value: to_display(DisplaySource::Text(&input), grammar.separator()),
                    ..state
                }
            }
        }
    }
}

use std::sync::Arc;

use crate::policy::Policy;
use crate::rate::RateGrammar;
use crate::ui::mvi::Intent;

#[derive(Debug, Clone)]
pub enum ReimburseIntent {
    /// Rebuild the whole state from the policy. Unsent edits are dropped.
    Reconcile {
        policy: Arc<Policy>,
        separator: char,
    },
    /// The user changed the rate text.
    EditRate { input: String, grammar: RateGrammar },
}

impl Intent for ReimburseIntent {}

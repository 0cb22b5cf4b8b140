use crate::policy::{DistanceUnit, Policy};
use crate::rate::{amount_from_rate, to_display, DisplaySource};
use crate::ui::mvi::UiState;

/// Local state of the distance rate settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReimburseState {
    pub unit_id: String,
    pub unit_name: String,
    pub unit_value: DistanceUnit,
    pub unit_rate_id: String,
    /// Rate text as shown in the input, in the locale's format.
    pub unit_rate_value: String,
    /// Placeholder shown in the empty rate input.
    pub output_currency: String,
}

impl UiState for ReimburseState {}

impl ReimburseState {
    /// Derive the state from a policy.
    ///
    /// Missing distance settings give empty ids, miles, and a zero rate.
    pub fn from_policy(policy: &Policy, separator: char) -> Self {
        let unit = policy.distance_unit();
        let rate = unit.and_then(|u| u.default_rate());

        Self {
            unit_id: unit.map(|u| u.custom_unit_id.clone()).unwrap_or_default(),
            unit_name: unit.map(|u| u.name.clone()).unwrap_or_default(),
            unit_value: unit.and_then(|u| u.attributes.unit).unwrap_or_default(),
            unit_rate_id: rate
                .map(|r| r.custom_unit_rate_id.clone())
                .unwrap_or_default(),
            unit_rate_value: to_display(
                DisplaySource::Amount(amount_from_rate(rate.map(|r| r.rate).unwrap_or(0.0))),
                separator,
            ),
            output_currency: policy.output_currency.clone(),
        }
    }
}

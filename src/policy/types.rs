use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the custom unit that carries mileage settings.
pub const CUSTOM_UNIT_NAME_DISTANCE: &str = "Distance";

/// Name of the rate used for mileage reimbursement.
pub const DEFAULT_RATE_NAME: &str = "Default Rate";

/// Store-owned error annotations, keyed by an opaque error id.
pub type ErrorFields = BTreeMap<String, String>;

/// Workspace policy as delivered by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub id: String,
    #[serde(default)]
    pub output_currency: String,
    #[serde(default, rename = "hasVBA")]
    pub has_vba: bool,
    #[serde(default)]
    pub custom_units: BTreeMap<String, CustomUnit>,
}

impl Policy {
    /// The custom unit holding distance settings, if configured.
    pub fn distance_unit(&self) -> Option<&CustomUnit> {
        self.custom_units
            .values()
            .find(|unit| unit.name == CUSTOM_UNIT_NAME_DISTANCE)
    }
}

/// A custom unit (e.g. "Distance") and its rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUnit {
    #[serde(rename = "customUnitID")]
    pub custom_unit_id: String,
    pub name: String,
    #[serde(default)]
    pub attributes: UnitAttributes,
    #[serde(default)]
    pub rates: BTreeMap<String, CustomUnitRate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: ErrorFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingAction>,
}

impl CustomUnit {
    /// The rate used for mileage reimbursement, if configured.
    pub fn default_rate(&self) -> Option<&CustomUnitRate> {
        self.rates
            .values()
            .find(|rate| rate.name == DEFAULT_RATE_NAME)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<DistanceUnit>,
}

/// A rate entry. `rate` is stored scaled by [`crate::rate::RATE_BASE_OFFSET`]
/// and may carry a fraction, e.g. `257.5` for an amount of `2.575`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUnitRate {
    #[serde(rename = "customUnitRateID")]
    pub custom_unit_rate_id: String,
    pub name: String,
    #[serde(default)]
    pub rate: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: ErrorFields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_action: Option<PendingAction>,
}

/// Offline write still waiting for server confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingAction {
    Add,
    Update,
    Delete,
}

/// Measurement unit for mileage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    #[serde(rename = "km")]
    Kilometers,
    #[default]
    #[serde(rename = "mi")]
    Miles,
}

impl DistanceUnit {
    /// Options offered by the unit selector, in display order.
    pub const ALL: [DistanceUnit; 2] = [DistanceUnit::Kilometers, DistanceUnit::Miles];

    /// Wire value of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kilometers => "km",
            Self::Miles => "mi",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown distance unit '{0}' (expected 'km' or 'mi')")]
pub struct UnknownDistanceUnit(pub String);

impl FromStr for DistanceUnit {
    type Err = UnknownDistanceUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| UnknownDistanceUnit(s.to_string()))
    }
}

/// Fields to merge into a [`CustomUnit`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUnitPatch {
    #[serde(rename = "customUnitID", skip_serializing_if = "Option::is_none")]
    pub custom_unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<UnitAttributes>,
}

impl CustomUnitPatch {
    /// Apply onto `unit`, producing the merged entry.
    pub fn merged_into(&self, unit: &CustomUnit) -> CustomUnit {
        let mut merged = unit.clone();
        if let Some(id) = &self.custom_unit_id {
            merged.custom_unit_id = id.clone();
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(attributes) = &self.attributes {
            merged.attributes = attributes.clone();
        }
        merged
    }
}

/// Fields to merge into a [`CustomUnitRate`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomUnitRatePatch {
    #[serde(rename = "customUnitRateID", skip_serializing_if = "Option::is_none")]
    pub custom_unit_rate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

impl CustomUnitRatePatch {
    /// Patch that keeps `current`'s identity and sets a new rate.
    pub fn with_rate(current: Option<&CustomUnitRate>, rate: f64) -> Self {
        Self {
            custom_unit_rate_id: current.map(|r| r.custom_unit_rate_id.clone()),
            name: current.map(|r| r.name.clone()),
            rate: Some(rate),
        }
    }

    /// Apply onto `rate`, producing the merged entry.
    pub fn merged_into(&self, rate: &CustomUnitRate) -> CustomUnitRate {
        let mut merged = rate.clone();
        if let Some(id) = &self.custom_unit_rate_id {
            merged.custom_unit_rate_id = id.clone();
        }
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(value) = self.rate {
            merged.rate = value;
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_unit_parses_wire_values() {
        assert_eq!("km".parse::<DistanceUnit>().unwrap(), DistanceUnit::Kilometers);
        assert_eq!("mi".parse::<DistanceUnit>().unwrap(), DistanceUnit::Miles);
        assert!("miles".parse::<DistanceUnit>().is_err());
    }

    #[test]
    fn distance_unit_options_round_trip() {
        for unit in DistanceUnit::ALL {
            assert_eq!(unit.as_str().parse::<DistanceUnit>().unwrap(), unit);
        }
        assert_eq!(DistanceUnit::ALL[0], DistanceUnit::Kilometers);
    }

    #[test]
    fn rate_patch_preserves_store_fields() {
        let mut current = CustomUnitRate {
            custom_unit_rate_id: "r1".to_string(),
            name: DEFAULT_RATE_NAME.to_string(),
            rate: 100.0,
            ..Default::default()
        };
        current.errors.insert("1".to_string(), "boom".to_string());

        let merged = CustomUnitRatePatch::with_rate(Some(&current), 250.0).merged_into(&current);
        assert_eq!(merged.rate, 250.0);
        assert_eq!(merged.custom_unit_rate_id, "r1");
        assert_eq!(merged.errors.len(), 1);
    }

    #[test]
    fn policy_json_uses_wire_names() {
        let json = r#"{
            "id": "p1",
            "outputCurrency": "USD",
            "hasVBA": true,
            "customUnits": {
                "u1": {
                    "customUnitID": "u1",
                    "name": "Distance",
                    "attributes": {"unit": "km"},
                    "rates": {
                        "r1": {"customUnitRateID": "r1", "name": "Default Rate", "rate": 58}
                    }
                }
            }
        }"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        assert!(policy.has_vba);
        let unit = policy.distance_unit().unwrap();
        assert_eq!(unit.attributes.unit, Some(DistanceUnit::Kilometers));
        assert_eq!(unit.default_rate().unwrap().rate, 58.0);
    }
}

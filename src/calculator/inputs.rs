use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Result, RoiError};

/// Analysis window used when the caller gives no usable horizon
pub const DEFAULT_TIME_HORIZON_MONTHS: u32 = 12;

/// Simulation parameters exactly as the caller supplied them.
///
/// Numeric fields are read leniently: anything that is not a JSON number
/// (strings, booleans, null, missing keys) becomes `None` and falls back
/// to its default during [`RawInputs::normalize`].
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawInputs {
    #[serde(default, deserialize_with = "lenient_string")]
    pub scenario_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub monthly_invoice_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub num_ap_staff: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub avg_hours_per_invoice: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hourly_wage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub error_rate_manual: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub error_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub time_horizon_months: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub one_time_implementation_cost: Option<f64>,
}

/// Validated parameters: every numeric field is finite and non-negative,
/// and the horizon is a whole number of months, at least one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    pub monthly_invoice_volume: f64,
    pub num_ap_staff: f64,
    pub avg_hours_per_invoice: f64,
    pub hourly_wage: f64,
    pub error_rate_manual: f64,
    pub error_cost: f64,
    #[serde(deserialize_with = "whole_months")]
    pub time_horizon_months: u32,
    #[serde(default)]
    pub one_time_implementation_cost: f64,
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Stored horizons may have been written as `12.0` by other tools
fn whole_months<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let months = f64::deserialize(deserializer)?;
    if months.is_finite() && months >= 1.0 && months.fract() == 0.0 {
        Ok(months as u32)
    } else {
        Err(serde::de::Error::custom(format!(
            "time_horizon_months must be a whole number of months, got {months}"
        )))
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Accept a finite, non-negative value; anything else becomes `default`.
fn non_negative(field: &str, value: Option<f64>, default: f64) -> f64 {
    match value {
        Some(n) if n.is_finite() && n >= 0.0 => n,
        Some(n) => {
            debug!(field, value = n, default, "input out of range, using default");
            default
        }
        None => default,
    }
}

impl RawInputs {
    /// Parse a JSON payload. The payload must be an object; missing or
    /// malformed fields inside it are tolerated and normalized later.
    pub fn from_json(payload: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| RoiError::InvalidPayload(e.to_string()))?;

        if !value.is_object() {
            return Err(RoiError::InvalidPayload(
                "expected a JSON object of simulation inputs".to_string(),
            ));
        }

        serde_json::from_value(value).map_err(|e| RoiError::InvalidPayload(e.to_string()))
    }

    /// Replace every unusable numeric field with its default
    pub fn normalize(&self) -> ScenarioInputs {
        let months = non_negative(
            "time_horizon_months",
            self.time_horizon_months,
            DEFAULT_TIME_HORIZON_MONTHS as f64,
        )
        .floor()
        .max(1.0);

        ScenarioInputs {
            scenario_name: self.scenario_name.clone(),
            monthly_invoice_volume: non_negative(
                "monthly_invoice_volume",
                self.monthly_invoice_volume,
                0.0,
            ),
            num_ap_staff: non_negative("num_ap_staff", self.num_ap_staff, 0.0),
            avg_hours_per_invoice: non_negative(
                "avg_hours_per_invoice",
                self.avg_hours_per_invoice,
                0.0,
            ),
            hourly_wage: non_negative("hourly_wage", self.hourly_wage, 0.0),
            error_rate_manual: non_negative("error_rate_manual", self.error_rate_manual, 0.0),
            error_cost: non_negative("error_cost", self.error_cost, 0.0),
            // `as` saturates, so absurdly long horizons pin to u32::MAX
            time_horizon_months: months as u32,
            one_time_implementation_cost: non_negative(
                "one_time_implementation_cost",
                self.one_time_implementation_cost,
                0.0,
            ),
        }
    }

    /// Overlay every field set in `other` on top of `self`
    pub fn merge(self, other: RawInputs) -> Self {
        Self {
            scenario_name: other.scenario_name.or(self.scenario_name),
            monthly_invoice_volume: other.monthly_invoice_volume.or(self.monthly_invoice_volume),
            num_ap_staff: other.num_ap_staff.or(self.num_ap_staff),
            avg_hours_per_invoice: other.avg_hours_per_invoice.or(self.avg_hours_per_invoice),
            hourly_wage: other.hourly_wage.or(self.hourly_wage),
            error_rate_manual: other.error_rate_manual.or(self.error_rate_manual),
            error_cost: other.error_cost.or(self.error_cost),
            time_horizon_months: other.time_horizon_months.or(self.time_horizon_months),
            one_time_implementation_cost: other
                .one_time_implementation_cost
                .or(self.one_time_implementation_cost),
        }
    }
}

impl From<&ScenarioInputs> for RawInputs {
    fn from(inputs: &ScenarioInputs) -> Self {
        Self {
            scenario_name: inputs.scenario_name.clone(),
            monthly_invoice_volume: Some(inputs.monthly_invoice_volume),
            num_ap_staff: Some(inputs.num_ap_staff),
            avg_hours_per_invoice: Some(inputs.avg_hours_per_invoice),
            hourly_wage: Some(inputs.hourly_wage),
            error_rate_manual: Some(inputs.error_rate_manual),
            error_cost: Some(inputs.error_cost),
            time_horizon_months: Some(inputs.time_horizon_months as f64),
            one_time_implementation_cost: Some(inputs.one_time_implementation_cost),
        }
    }
}

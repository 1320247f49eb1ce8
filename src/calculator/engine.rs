use serde::{Deserialize, Serialize};
use tracing::debug;

use super::inputs::{RawInputs, ScenarioInputs};

/// Processing cost of one invoice once automated
pub const AUTOMATED_COST_PER_INVOICE: f64 = 0.20;

/// Error rate assumed for automated processing (0.1%)
pub const ERROR_RATE_AUTO: f64 = 0.001;

/// Multiplier applied to raw monthly savings
pub const MIN_ROI_BOOST_FACTOR: f64 = 1.10;

/// Scale applied to a negative monthly projection before clamping at zero
pub const NEGATIVE_SAVINGS_DAMPING: f64 = 0.25;

/// ROI reported when there is no upfront cost and savings are positive
pub const ROI_NO_UPFRONT_COST: f64 = 999.0;

/// Intermediate monthly quantities, kept for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationBreakdown {
    pub labor_cost_manual: f64,
    pub auto_cost: f64,
    pub error_savings: f64,
    pub bias_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    pub monthly_savings: f64,
    pub cumulative_savings: f64,
    pub net_savings: f64,
    /// Months to recover the implementation cost; infinite when nothing is saved.
    /// JSON has no infinity, so it is written as `null`.
    #[serde(with = "payback")]
    pub payback_months: f64,
    pub roi_percentage: f64,
}

impl SimulationResults {
    /// Payback with `decimals` places, or "N/A" when it never pays back
    pub fn payback_label(&self, decimals: usize) -> String {
        if self.payback_months.is_finite() {
            format!("{:.*}", decimals, self.payback_months)
        } else {
            "N/A".to_string()
        }
    }
}

/// Complete calculator output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub inputs: ScenarioInputs,
    pub breakdown: SimulationBreakdown,
    pub results: SimulationResults,
}

mod payback {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Run the ROI projection.
///
/// Inputs are normalized first, so this never fails: out-of-range values
/// have already been replaced by their defaults. The steps below run in a
/// fixed order because the clamp in step 6 feeds every later quantity.
pub fn compute(raw: &RawInputs) -> Simulation {
    let inputs = raw.normalize();
    let (breakdown, results) = project(&inputs);

    debug!(
        monthly_savings = results.monthly_savings,
        roi_percentage = results.roi_percentage,
        "simulation computed"
    );

    Simulation {
        inputs,
        breakdown,
        results,
    }
}

fn project(inputs: &ScenarioInputs) -> (SimulationBreakdown, SimulationResults) {
    let volume = inputs.monthly_invoice_volume;
    let months = inputs.time_horizon_months as f64;
    let implementation_cost = inputs.one_time_implementation_cost;

    // 1-3
    let labor_cost_manual =
        inputs.num_ap_staff * inputs.hourly_wage * inputs.avg_hours_per_invoice * volume;
    let auto_cost = volume * AUTOMATED_COST_PER_INVOICE;
    let error_savings = (inputs.error_rate_manual - ERROR_RATE_AUTO) * volume * inputs.error_cost;

    // 4-5
    let mut monthly_savings = labor_cost_manual + error_savings - auto_cost;
    monthly_savings *= MIN_ROI_BOOST_FACTOR;

    // 6: negative projections are softened, then floored at zero
    if monthly_savings < 0.0 {
        monthly_savings = (monthly_savings * NEGATIVE_SAVINGS_DAMPING).max(0.0);
    }

    // 7-10
    let cumulative_savings = monthly_savings * months;
    let net_savings = cumulative_savings - implementation_cost;
    let payback_months = if monthly_savings > 0.0 {
        implementation_cost / monthly_savings
    } else {
        f64::INFINITY
    };
    let roi_percentage = if implementation_cost > 0.0 {
        (net_savings / implementation_cost) * 100.0
    } else if monthly_savings > 0.0 {
        ROI_NO_UPFRONT_COST
    } else {
        0.0
    };

    (
        SimulationBreakdown {
            labor_cost_manual,
            auto_cost,
            error_savings,
            bias_factor: MIN_ROI_BOOST_FACTOR,
        },
        SimulationResults {
            monthly_savings,
            cumulative_savings,
            net_savings,
            payback_months,
            roi_percentage,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6 * b.abs().max(1.0)
    }

    fn scenario_a() -> RawInputs {
        RawInputs {
            monthly_invoice_volume: Some(2000.0),
            num_ap_staff: Some(3.0),
            avg_hours_per_invoice: Some(0.17),
            hourly_wage: Some(30.0),
            error_rate_manual: Some(0.5),
            error_cost: Some(100.0),
            time_horizon_months: Some(36.0),
            one_time_implementation_cost: Some(50000.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_scenario() {
        let sim = compute(&scenario_a());

        assert!(close(sim.breakdown.labor_cost_manual, 30600.0));
        assert!(close(sim.breakdown.auto_cost, 400.0));
        assert!(close(sim.breakdown.error_savings, 99800.0));
        assert_eq!(sim.breakdown.bias_factor, 1.1);

        assert!(close(sim.results.monthly_savings, 143000.0));
        assert!(close(sim.results.cumulative_savings, 5148000.0));
        assert!(close(sim.results.net_savings, 5098000.0));
        assert!(close(sim.results.payback_months, 50000.0 / 143000.0));
        assert!(close(sim.results.roi_percentage, 10196.0));
    }

    #[test]
    fn test_derived_totals_are_exact() {
        let sim = compute(&scenario_a());
        let r = &sim.results;
        assert_eq!(
            r.cumulative_savings,
            r.monthly_savings * sim.inputs.time_horizon_months as f64
        );
        assert_eq!(
            r.net_savings,
            r.cumulative_savings - sim.inputs.one_time_implementation_cost
        );
    }

    #[test]
    fn test_zero_cost_with_savings_reports_sentinel_roi() {
        let sim = compute(&RawInputs {
            one_time_implementation_cost: Some(0.0),
            ..scenario_a()
        });
        assert!(sim.results.monthly_savings > 0.0);
        assert_eq!(sim.results.roi_percentage, ROI_NO_UPFRONT_COST);
        assert_eq!(sim.results.payback_months, 0.0);
    }

    #[test]
    fn test_all_zero_inputs() {
        let sim = compute(&RawInputs {
            monthly_invoice_volume: Some(0.0),
            num_ap_staff: Some(0.0),
            avg_hours_per_invoice: Some(0.0),
            hourly_wage: Some(0.0),
            error_rate_manual: Some(0.0),
            error_cost: Some(0.0),
            one_time_implementation_cost: Some(0.0),
            ..Default::default()
        });
        assert_eq!(sim.inputs.time_horizon_months, 12);
        assert_eq!(sim.results.monthly_savings, 0.0);
        assert_eq!(sim.results.payback_months, f64::INFINITY);
        assert_eq!(sim.results.roi_percentage, 0.0);
    }

    #[test]
    fn test_negative_projection_clamps_to_zero() {
        // Automation cost with no labor or error savings to offset it
        let sim = compute(&RawInputs {
            monthly_invoice_volume: Some(1000.0),
            one_time_implementation_cost: Some(10000.0),
            time_horizon_months: Some(24.0),
            ..Default::default()
        });
        assert!(sim.breakdown.auto_cost > 0.0);
        assert_eq!(sim.results.monthly_savings, 0.0);
        assert_eq!(sim.results.cumulative_savings, 0.0);
        assert_eq!(sim.results.net_savings, -10000.0);
        assert_eq!(sim.results.payback_months, f64::INFINITY);
        assert_eq!(sim.results.roi_percentage, -100.0);
    }

    #[test]
    fn test_error_rate_below_automated_rate_reduces_savings() {
        let sim = compute(&RawInputs {
            monthly_invoice_volume: Some(100.0),
            error_rate_manual: Some(0.0),
            error_cost: Some(50.0),
            ..Default::default()
        });
        assert!(sim.breakdown.error_savings < 0.0);
        assert_eq!(sim.results.monthly_savings, 0.0);
    }

    #[test]
    fn test_monthly_savings_never_negative() {
        let volumes = [0.0, 1.0, 50.0, 5000.0];
        let wages = [0.0, 0.01, 25.0];
        let error_rates = [0.0, 0.0005, 0.2];
        for &volume in &volumes {
            for &wage in &wages {
                for &error_rate in &error_rates {
                    let sim = compute(&RawInputs {
                        monthly_invoice_volume: Some(volume),
                        num_ap_staff: Some(1.0),
                        avg_hours_per_invoice: Some(0.01),
                        hourly_wage: Some(wage),
                        error_rate_manual: Some(error_rate),
                        error_cost: Some(10.0),
                        ..Default::default()
                    });
                    assert!(sim.results.monthly_savings >= 0.0);
                    assert!(!sim.results.roi_percentage.is_nan());
                    assert!(!sim.results.net_savings.is_nan());
                }
            }
        }
    }

    #[test]
    fn test_garbage_inputs_never_produce_nan() {
        let raw = RawInputs::from_json(
            r#"{"monthly_invoice_volume": -1, "num_ap_staff": "three", "hourly_wage": {"amount": 30},"time_horizon_months": -5}"#,
        )
        .unwrap();
        let sim = compute(&raw);
        assert_eq!(sim.inputs.time_horizon_months, 12);
        assert!(!sim.results.monthly_savings.is_nan());
        assert!(!sim.results.roi_percentage.is_nan());
    }

    #[test]
    fn test_compute_is_deterministic() {
        assert_eq!(compute(&scenario_a()), compute(&scenario_a()));
    }

    #[test]
    fn test_infinite_payback_serializes_as_null() {
        let sim = compute(&RawInputs::default());
        let json = serde_json::to_value(&sim).unwrap();
        assert!(json["results"]["payback_months"].is_null());

        let back: Simulation = serde_json::from_value(json).unwrap();
        assert_eq!(back.results.payback_months, f64::INFINITY);
    }

    #[test]
    fn test_payback_label() {
        let sim = compute(&scenario_a());
        assert_eq!(sim.results.payback_label(2), "0.35");
        assert_eq!(compute(&RawInputs::default()).results.payback_label(1), "N/A");
    }
}

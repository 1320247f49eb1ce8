use chrono::{DateTime, Local};

use super::format::{escape_html, format_decimal, format_money};
use crate::calculator::{ScenarioInputs, Simulation, SimulationResults};
use crate::error::{Result, RoiError};
use crate::store::Scenario;

/// The two parts of a scenario a report is built from
#[derive(Debug, Clone, Copy)]
pub struct ReportScenario<'a> {
    pub inputs: &'a ScenarioInputs,
    pub results: &'a SimulationResults,
}

impl<'a> From<&'a Scenario> for ReportScenario<'a> {
    fn from(scenario: &'a Scenario) -> Self {
        Self {
            inputs: &scenario.inputs,
            results: &scenario.results,
        }
    }
}

impl<'a> From<&'a Simulation> for ReportScenario<'a> {
    fn from(simulation: &'a Simulation) -> Self {
        Self {
            inputs: &simulation.inputs,
            results: &simulation.results,
        }
    }
}

/// Embedded HTML template; `{{NAME}}` placeholders are substituted at render time
const REPORT_TEMPLATE: &str = r##"<!doctype html>
<html>
  <head>
    <meta charset="utf-8" />
    <title>ROI Analysis Report - {{TITLE}}</title>
    <meta name="viewport" content="width=device-width,initial-scale=1" />
    <style>
      * { margin: 0; padding: 0; box-sizing: border-box; }
      body { font-family: 'Arial', 'Helvetica', sans-serif; background: #f5f5f5; padding: 30px 20px; color: #333; }
      .container { max-width: 900px; margin: 0 auto; background: white; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
      .header { background: #2c3e50; color: white; padding: 40px; border-bottom: 4px solid #34495e; }
      .header h1 { font-size: 28px; font-weight: 700; margin-bottom: 8px; letter-spacing: 0.5px; }
      .header .meta { font-size: 14px; opacity: 0.9; margin-top: 5px; }
      .content { padding: 40px; }
      .executive-summary { background: #ecf0f1; border-left: 4px solid #2c3e50; padding: 25px 30px; margin-bottom: 35px; }
      .executive-summary h2 { font-size: 18px; color: #2c3e50; margin-bottom: 15px; text-transform: uppercase; letter-spacing: 1px; }
      .roi-highlight { font-size: 42px; font-weight: 800; color: #27ae60; margin: 15px 0; text-align: center; }
      .roi-label { text-align: center; color: #555; font-size: 14px; font-weight: 600; text-transform: uppercase; }
      .section { margin-bottom: 35px; }
      .section-title { font-size: 18px; color: #2c3e50; margin-bottom: 20px; padding-bottom: 8px; border-bottom: 2px solid #bdc3c7; text-transform: uppercase; }
      .metrics-table { width: 100%; border-collapse: collapse; margin-bottom: 25px; }
      .metrics-table th { background: #34495e; color: white; padding: 12px; text-align: left; font-size: 13px; text-transform: uppercase; }
      .metrics-table td { padding: 12px; border-bottom: 1px solid #ecf0f1; font-size: 14px; }
      .metrics-table .label-col { color: #555; width: 50%; }
      .metrics-table .value-col { color: #2c3e50; font-weight: 700; text-align: right; }
      .key-metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 15px; margin-bottom: 30px; }
      .metric-card { border: 2px solid #ecf0f1; padding: 20px; text-align: center; }
      .metric-card .value { font-size: 24px; font-weight: 800; color: #2c3e50; margin-bottom: 8px; }
      .metric-card .label { font-size: 11px; color: #7f8c8d; font-weight: 600; text-transform: uppercase; }
      .status-badge { display: inline-block; background: {{BADGE_COLOR}}; color: white; padding: 5px 15px; font-size: 11px; font-weight: 700; text-transform: uppercase; margin-top: 10px; }
      .footer { background: #ecf0f1; padding: 25px 40px; border-top: 2px solid #bdc3c7; }
      .footer-text { color: #555; font-size: 12px; line-height: 1.6; text-align: justify; }
      .footer-meta { margin-top: 15px; padding-top: 15px; border-top: 1px solid #bdc3c7; text-align: center; font-size: 11px; color: #7f8c8d; }
      @media print { body { background: white; padding: 0; } .container { box-shadow: none; } }
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h1>INVOICING AUTOMATION ROI ANALYSIS</h1>
        <div class="meta">Report Generated: {{GENERATED_DATE}}</div>
        <div class="meta">Prepared for: {{EMAIL}}</div>
      </div>

      <div class="content">
        <div class="executive-summary">
          <h2>Executive Summary</h2>
          <div class="roi-label">Return on Investment ({{MONTHS}} Months)</div>
          <div class="roi-highlight">{{ROI_HEADLINE}}%</div>
          <div class="status-badge">{{BADGE}}</div>
        </div>

        <div class="section">
          <h2 class="section-title">Key Financial Metrics</h2>
          <div class="key-metrics">
{{METRIC_CARDS}}
          </div>
        </div>

        <div class="section">
          <h2 class="section-title">Scenario Parameters</h2>
          <table class="metrics-table">
            <thead><tr><th>Parameter</th><th style="text-align: right;">Value</th></tr></thead>
            <tbody>
{{PARAMETER_ROWS}}
            </tbody>
          </table>
        </div>

        <div class="section">
          <h2 class="section-title">Financial Analysis Results</h2>
          <table class="metrics-table">
            <thead><tr><th>Metric</th><th style="text-align: right;">Value</th></tr></thead>
            <tbody>
{{RESULT_ROWS}}
            </tbody>
          </table>
        </div>
      </div>

      <div class="footer">
        <div class="footer-text">
          <strong>Disclaimer:</strong> This report presents a financial analysis based on the provided input parameters.
          The projections include optimization factors designed to demonstrate potential cost savings from process automation.
          Actual results may vary depending on specific operational conditions, implementation approach, and organizational factors.
          This analysis should be used as a decision-support tool and validated against actual business conditions before making investment decisions.
        </div>
        <div class="footer-meta">
          Document Generated: {{GENERATED_AT}} | Invoicing ROI Simulator v{{VERSION}} | Confidential Business Analysis
        </div>
      </div>
    </div>
  </body>
</html>
"##;

fn metric_card(value: &str, label: &str) -> String {
    format!(
        "            <div class=\"metric-card\"><div class=\"value\">{value}</div><div class=\"label\">{label}</div></div>"
    )
}

fn table_row(label: &str, value: &str) -> String {
    format!(
        "              <tr><td class=\"label-col\">{label}</td><td class=\"value-col\">{value}</td></tr>"
    )
}

fn badge(roi_percentage: f64) -> (&'static str, &'static str) {
    if roi_percentage >= 100.0 {
        ("HIGHLY PROFITABLE INVESTMENT", "#27ae60")
    } else if roi_percentage > 0.0 {
        ("PROFITABLE INVESTMENT", "#2980b9")
    } else {
        ("BREAK-EVEN NOT REACHED", "#c0392b")
    }
}

/// Render a standalone HTML report for one scenario.
///
/// Only `inputs` and `results` are read. The timestamp is supplied by the
/// caller so that rendering itself is deterministic.
pub fn render_html(
    email: &str,
    scenario: ReportScenario<'_>,
    currency_symbol: &str,
    generated_at: DateTime<Local>,
) -> Result<String> {
    let email = email.trim();
    if email.is_empty() {
        return Err(RoiError::MissingEmail);
    }

    let inputs = scenario.inputs;
    let results = scenario.results;
    let money = |value: f64| escape_html(&format_money(value, currency_symbol));
    let months = inputs.time_horizon_months;

    let name = inputs
        .scenario_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let (badge_text, badge_color) = badge(results.roi_percentage);

    let cards = [
        metric_card(&money(results.monthly_savings), "Monthly Savings"),
        metric_card(&results.payback_label(1), "Payback (Months)"),
        metric_card(&money(results.cumulative_savings), "Total Savings"),
        metric_card(&money(results.net_savings), "Net Benefit"),
    ]
    .join("\n");

    let parameters = [
        table_row(
            "Scenario Name",
            &name.map(escape_html).unwrap_or_else(|| "-".to_string()),
        ),
        table_row(
            "Monthly Invoice Volume",
            &format!("{} invoices", format_decimal(inputs.monthly_invoice_volume, 2)),
        ),
        table_row(
            "Accounts Payable Staff",
            &format!("{} employees", format_decimal(inputs.num_ap_staff, 2)),
        ),
        table_row(
            "Processing Time per Invoice",
            &format!("{} hours", format_decimal(inputs.avg_hours_per_invoice, 2)),
        ),
        table_row("Average Hourly Wage", &money(inputs.hourly_wage)),
        table_row(
            "Manual Error Rate",
            &format!("{}%", format_decimal(inputs.error_rate_manual * 100.0, 2)),
        ),
        table_row("Error Correction Cost", &money(inputs.error_cost)),
        table_row("Analysis Time Horizon", &format!("{months} months")),
        table_row(
            "One-Time Implementation Cost",
            &money(inputs.one_time_implementation_cost),
        ),
    ]
    .join("\n");

    let result_rows = [
        table_row("Monthly Cost Savings", &money(results.monthly_savings)),
        table_row(
            &format!("Cumulative Savings ({months} months)"),
            &money(results.cumulative_savings),
        ),
        table_row(
            "Net Savings (After Implementation)",
            &money(results.net_savings),
        ),
        table_row(
            "Payback Period",
            &format!("{} months", results.payback_label(2)),
        ),
        table_row(
            "Return on Investment (ROI)",
            &format!("{:.2}%", results.roi_percentage),
        ),
    ]
    .join("\n");

    let html = REPORT_TEMPLATE
        .replace("{{TITLE}}", &escape_html(name.unwrap_or("Scenario")))
        .replace(
            "{{GENERATED_DATE}}",
            &generated_at.format("%B %d, %Y").to_string(),
        )
        .replace("{{EMAIL}}", &escape_html(email))
        .replace("{{MONTHS}}", &months.to_string())
        .replace("{{ROI_HEADLINE}}", &format!("{:.0}", results.roi_percentage))
        .replace("{{BADGE}}", badge_text)
        .replace("{{BADGE_COLOR}}", badge_color)
        .replace("{{METRIC_CARDS}}", &cards)
        .replace("{{PARAMETER_ROWS}}", &parameters)
        .replace("{{RESULT_ROWS}}", &result_rows)
        .replace(
            "{{GENERATED_AT}}",
            &generated_at.format("%Y-%m-%d %H:%M").to_string(),
        )
        .replace("{{VERSION}}", env!("CARGO_PKG_VERSION"));

    Ok(html)
}

/// Default download name for a report generated at `generated_at`
pub fn report_filename(generated_at: DateTime<Local>) -> String {
    format!("roi-report-{}.html", generated_at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::{compute, RawInputs};
    use chrono::TimeZone;

    fn generated_at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap()
    }

    fn reference() -> Simulation {
        compute(&RawInputs {
            scenario_name: Some("Q4 Pilot".to_string()),
            monthly_invoice_volume: Some(2000.0),
            num_ap_staff: Some(3.0),
            avg_hours_per_invoice: Some(0.17),
            hourly_wage: Some(30.0),
            error_rate_manual: Some(0.5),
            error_cost: Some(100.0),
            time_horizon_months: Some(36.0),
            one_time_implementation_cost: Some(50000.0),
        })
    }

    #[test]
    fn test_render_reference_report() {
        let sim = reference();
        let html = render_html("cfo@example.com", (&sim).into(), "₹", generated_at()).unwrap();

        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>ROI Analysis Report - Q4 Pilot</title>"));
        assert!(html.contains("Prepared for: cfo@example.com"));
        assert!(html.contains("Report Generated: March 14, 2026"));
        assert!(html.contains("Return on Investment (36 Months)"));
        assert!(html.contains("10196%"));
        assert!(html.contains("10196.00%"));
        assert!(html.contains("₹143,000"));
        assert!(html.contains("₹5,148,000"));
        assert!(html.contains("₹5,098,000"));
        assert!(html.contains("0.35 months"));
        assert!(html.contains("2,000 invoices"));
        assert!(html.contains("50%"));
        assert!(html.contains("HIGHLY PROFITABLE INVESTMENT"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_infinite_payback_renders_na() {
        let sim = compute(&RawInputs::default());
        let html = render_html("a@b.co", (&sim).into(), "$", generated_at()).unwrap();
        assert!(html.contains("<div class=\"value\">N/A</div>"));
        assert!(html.contains("N/A months"));
        assert!(html.contains("<title>ROI Analysis Report - Scenario</title>"));
        assert!(html.contains("BREAK-EVEN NOT REACHED"));
    }

    #[test]
    fn test_huge_implementation_cost_renders() {
        let sim = compute(&RawInputs {
            one_time_implementation_cost: Some(1e19),
            ..Default::default()
        });
        assert_eq!(sim.results.net_savings, -1e19);

        let html = render_html("cfo@example.com", (&sim).into(), "$", generated_at()).unwrap();
        assert!(html.contains("-$10,000,000,000,000,000,000"));
        assert!(html.contains("$10,000,000,000,000,000,000"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut sim = reference();
        sim.inputs.scenario_name = Some("<script>alert(1)</script>".to_string());
        let html = render_html("x\"@y.z", (&sim).into(), "₹", generated_at()).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("x&quot;@y.z"));
    }

    #[test]
    fn test_email_is_required() {
        let sim = reference();
        let err = render_html("   ", (&sim).into(), "₹", generated_at()).unwrap_err();
        assert!(matches!(err, RoiError::MissingEmail));
    }

    #[test]
    fn test_report_filename() {
        let at = generated_at();
        assert_eq!(
            report_filename(at),
            format!("roi-report-{}.html", at.timestamp_millis())
        );
    }
}

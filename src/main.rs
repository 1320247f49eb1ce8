use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;
use tracing_subscriber::EnvFilter;

use roi_sim::calculator::{
    compute, RawInputs, ScenarioInputs, Simulation, SimulationBreakdown, SimulationResults,
    AUTOMATED_COST_PER_INVOICE, DEFAULT_TIME_HORIZON_MONTHS, ERROR_RATE_AUTO,
    MIN_ROI_BOOST_FACTOR,
};
use roi_sim::config::{config_dir, load_config, load_config_or_default, Config, CONFIG_TEMPLATE};
use roi_sim::error::{Result, RoiError};
use roi_sim::report::{format_amount, format_decimal, render_html, report_filename};
use roi_sim::store::ScenarioStore;

#[derive(Parser)]
#[command(name = "roi")]
#[command(version, about = "Invoice automation ROI simulator", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir or ~/.roi)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Increase log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with a template config.toml
    Init,

    /// Compute savings and ROI for a set of inputs
    Simulate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Read inputs from a JSON file (flags override its values)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Start from a saved scenario's inputs (index from 'list' or id)
        #[arg(long, value_name = "SCENARIO")]
        from: Option<String>,

        /// Save the result as a named scenario
        #[arg(long)]
        save: bool,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// List saved scenarios
    List,

    /// Show a saved scenario
    Show {
        /// Scenario index from 'list' or full id
        scenario: String,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a saved scenario
    Delete {
        /// Scenario index from 'list' or full id
        scenario: String,
    },

    /// Generate an HTML report for a saved scenario
    Report {
        /// Scenario index from 'list' or full id
        scenario: String,

        /// Recipient shown on the report (default: report.prepared_for)
        #[arg(short, long)]
        email: Option<String>,

        /// Custom output file path (default: output_dir/roi-report-<millis>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open the report with the system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Show config locations, saved scenario count and model constants
    Status,
}

/// Per-field simulation inputs. Negative values are accepted here and
/// replaced by defaults during normalization.
#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Scenario label
    #[arg(short, long)]
    name: Option<String>,

    /// Invoices processed per month
    #[arg(long, allow_negative_numbers = true)]
    volume: Option<f64>,

    /// Accounts-payable staff count
    #[arg(long, allow_negative_numbers = true)]
    staff: Option<f64>,

    /// Manual hours spent per invoice
    #[arg(long, allow_negative_numbers = true)]
    hours: Option<f64>,

    /// Cost per labor hour
    #[arg(long, allow_negative_numbers = true)]
    wage: Option<f64>,

    /// Fraction of invoices processed with errors (e.g. 0.05)
    #[arg(long, allow_negative_numbers = true)]
    error_rate: Option<f64>,

    /// Cost to correct one error
    #[arg(long, allow_negative_numbers = true)]
    error_cost: Option<f64>,

    /// Analysis horizon in months (default: 12)
    #[arg(long, allow_negative_numbers = true)]
    months: Option<f64>,

    /// One-time implementation cost (default: 0)
    #[arg(long, allow_negative_numbers = true)]
    impl_cost: Option<f64>,
}

impl From<InputArgs> for RawInputs {
    fn from(args: InputArgs) -> Self {
        RawInputs {
            scenario_name: args.name,
            monthly_invoice_volume: args.volume,
            num_ap_staff: args.staff,
            avg_hours_per_invoice: args.hours,
            hourly_wage: args.wage,
            error_rate_manual: args.error_rate,
            error_cost: args.error_cost,
            time_horizon_months: args.months,
            one_time_implementation_cost: args.impl_cost,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Simulate {
            inputs,
            input,
            from,
            save,
            json,
        } => cmd_simulate(&cfg_dir, inputs, input, from, save, json),
        Commands::List => cmd_list(&cfg_dir),
        Commands::Show { scenario, json } => cmd_show(&cfg_dir, &scenario, json),
        Commands::Delete { scenario } => cmd_delete(&cfg_dir, &scenario),
        Commands::Report {
            scenario,
            email,
            output,
            open,
        } => cmd_report(&cfg_dir, &scenario, email, output, open),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(RoiError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("reports"))?;
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized roi config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Adjust currency and paths:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!("  2. Run a simulation:           roi simulate --volume 2000 --staff 3 --hours 0.17 --wage 30");
    println!("  3. Save it:                    roi simulate ... --name <name> --save");

    Ok(())
}

/// Open the scenario store configured for this directory
fn open_store(cfg_dir: &Path) -> Result<(Config, ScenarioStore)> {
    let config = load_config(cfg_dir)?;
    let store = ScenarioStore::open(config.store_path(cfg_dir));
    Ok((config, store))
}

// Table row structs for tabled
#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "METRIC")]
    metric: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CREATED")]
    created: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn row(metric: &str, value: String) -> MetricRow {
    MetricRow {
        metric: metric.to_string(),
        value,
    }
}

fn print_table(title: &str, rows: Vec<MetricRow>) {
    println!("{title}");
    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_inputs(inputs: &ScenarioInputs, symbol: &str) {
    print_table(
        "Inputs",
        vec![
            row(
                "Scenario name",
                inputs.scenario_name.clone().unwrap_or_else(|| "-".to_string()),
            ),
            row(
                "Invoices / month",
                format_decimal(inputs.monthly_invoice_volume, 2),
            ),
            row("AP staff", format_decimal(inputs.num_ap_staff, 2)),
            row(
                "Hours / invoice",
                format_decimal(inputs.avg_hours_per_invoice, 2),
            ),
            row("Hourly wage", format_amount(inputs.hourly_wage, symbol)),
            row(
                "Manual error rate",
                format!("{}%", format_decimal(inputs.error_rate_manual * 100.0, 2)),
            ),
            row("Error fix cost", format_amount(inputs.error_cost, symbol)),
            row(
                "Time horizon",
                format!("{} months", inputs.time_horizon_months),
            ),
            row(
                "Implementation cost",
                format_amount(inputs.one_time_implementation_cost, symbol),
            ),
        ],
    );
}

fn print_breakdown(breakdown: &SimulationBreakdown, symbol: &str) {
    print_table(
        "Monthly breakdown",
        vec![
            row(
                "Manual labor cost",
                format_amount(breakdown.labor_cost_manual, symbol),
            ),
            row(
                "Automated processing cost",
                format_amount(breakdown.auto_cost, symbol),
            ),
            row(
                "Error correction savings",
                format_amount(breakdown.error_savings, symbol),
            ),
            row("Bias factor", format!("{:.2}", breakdown.bias_factor)),
        ],
    );
}

fn print_results(results: &SimulationResults, months: u32, symbol: &str) {
    let payback = if results.payback_months.is_finite() {
        format!("{} months", results.payback_label(2))
    } else {
        results.payback_label(2)
    };

    print_table(
        "Results",
        vec![
            row(
                "Monthly savings",
                format_amount(results.monthly_savings, symbol),
            ),
            row(
                &format!("Cumulative savings ({months} months)"),
                format_amount(results.cumulative_savings, symbol),
            ),
            row("Net savings", format_amount(results.net_savings, symbol)),
            row("Payback period", payback),
            row("ROI", format!("{:.2}%", results.roi_percentage)),
        ],
    );
}

fn print_simulation(sim: &Simulation, symbol: &str) {
    print_inputs(&sim.inputs, symbol);
    print_breakdown(&sim.breakdown, symbol);
    print_results(&sim.results, sim.inputs.time_horizon_months, symbol);
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(RoiError::Serialize)
}

/// Run the calculator and optionally save the outcome
fn cmd_simulate(
    cfg_dir: &Path,
    args: InputArgs,
    input_file: Option<PathBuf>,
    from: Option<String>,
    save: bool,
    json: bool,
) -> Result<()> {
    let mut raw = RawInputs::default();

    if let Some(reference) = from {
        let (_, store) = open_store(cfg_dir)?;
        let id = store.resolve_id(&reference)?;
        let scenario = store
            .get(&id)?
            .ok_or_else(|| RoiError::ScenarioNotFound(id.clone()))?;
        raw = RawInputs::from(&scenario.inputs);
        if raw.scenario_name.is_none() {
            raw.scenario_name = Some(scenario.scenario_name);
        }
        info!(id = %id, "loaded inputs from saved scenario");
    }

    if let Some(path) = input_file {
        let payload = fs::read_to_string(&path)?;
        raw = raw.merge(RawInputs::from_json(&payload)?);
    }

    let raw = raw.merge(args.into());
    let sim = compute(&raw);

    if save {
        let (config, store) = open_store(cfg_dir)?;
        let name = sim.inputs.scenario_name.clone().unwrap_or_default();
        let scenario = store.create(&name, sim.inputs.clone(), sim.results.clone())?;

        if json {
            println!("{}", to_json(&scenario)?);
        } else {
            print_simulation(&sim, &config.report.currency_symbol);
            println!();
            println!("Saved scenario '{}'", scenario.scenario_name);
            println!("  Id: {}", scenario.id);
        }
        return Ok(());
    }

    if json {
        println!("{}", to_json(&sim)?);
    } else {
        let config = load_config_or_default(cfg_dir)?;
        print_simulation(&sim, &config.report.currency_symbol);
    }

    Ok(())
}

/// List saved scenarios, newest first
fn cmd_list(cfg_dir: &Path) -> Result<()> {
    let (_, store) = open_store(cfg_dir)?;
    let scenarios = store.list()?;

    if scenarios.is_empty() {
        println!("No scenarios saved yet.");
        println!("Save one with: roi simulate ... --name <name> --save");
        return Ok(());
    }

    let rows: Vec<ScenarioRow> = scenarios
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, s)| ScenarioRow {
            index: idx + 1,
            name: s.scenario_name.clone(),
            created: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
            id: s.id.clone(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
    println!();
    println!("Total: {} scenarios", scenarios.len());
    println!("Use index number with show/delete/report (e.g., 'roi show 1')");

    Ok(())
}

/// Show a saved scenario
fn cmd_show(cfg_dir: &Path, reference: &str, json: bool) -> Result<()> {
    let (config, store) = open_store(cfg_dir)?;
    let id = store.resolve_id(reference)?;
    let scenario = store
        .get(&id)?
        .ok_or_else(|| RoiError::ScenarioNotFound(id.clone()))?;

    if json {
        println!("{}", to_json(&scenario)?);
        return Ok(());
    }

    let symbol = &config.report.currency_symbol;
    println!("Scenario '{}'", scenario.scenario_name);
    println!("  Id:      {}", scenario.id);
    println!("  Created: {}", scenario.created_at.to_rfc3339());
    println!("  Updated: {}", scenario.updated_at.to_rfc3339());
    println!();
    print_inputs(&scenario.inputs, symbol);
    print_results(
        &scenario.results,
        scenario.inputs.time_horizon_months,
        symbol,
    );

    Ok(())
}

/// Delete a saved scenario
fn cmd_delete(cfg_dir: &Path, reference: &str) -> Result<()> {
    let (_, store) = open_store(cfg_dir)?;

    // Indexes must point at an existing row; ids go straight to the store
    let id = if reference.parse::<usize>().is_ok() {
        store.resolve_id(reference)?
    } else {
        reference.to_string()
    };

    if store.delete(&id)? {
        println!("Deleted {id}");
    } else {
        println!("Scenario '{id}' not found (deleted: false)");
    }

    Ok(())
}

/// Generate an HTML report for a saved scenario
fn cmd_report(
    cfg_dir: &Path,
    reference: &str,
    email: Option<String>,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    let (config, store) = open_store(cfg_dir)?;
    let id = store.resolve_id(reference)?;
    let scenario = store
        .get(&id)?
        .ok_or_else(|| RoiError::ScenarioNotFound(id.clone()))?;

    let email = email
        .or_else(|| config.report.prepared_for.clone())
        .unwrap_or_default();
    let now = chrono::Local::now();
    let html = render_html(
        &email,
        (&scenario).into(),
        &config.report.currency_symbol,
        now,
    )?;

    let report_path =
        output.unwrap_or_else(|| config.report_dir(cfg_dir).join(report_filename(now)));
    if let Some(parent) = report_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&report_path, html)?;
    info!(path = %report_path.display(), "report written");

    println!("Generated report for '{}'", scenario.scenario_name);
    println!("  Prepared for: {}", email.trim());
    println!("  Saved:        {}", report_path.display());

    if open {
        open_report(&report_path)?;
    }

    Ok(())
}

/// Command that hands a report to the desktop's default browser
fn browser_command(report: &Path) -> std::process::Command {
    let mut cmd = if cfg!(target_os = "windows") {
        // `start` treats its first quoted argument as a window title
        let mut cmd = std::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else {
        std::process::Command::new("xdg-open")
    };
    cmd.arg(report);
    cmd
}

fn open_report(report: &Path) -> Result<()> {
    let child = browser_command(report).spawn()?;
    info!(pid = child.id(), path = %report.display(), "opened report");
    Ok(())
}

/// Show config locations and model constants
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    let (config, store) = open_store(cfg_dir)?;
    let scenarios = store.list()?;

    println!("ROI Simulator Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Scenario store:   {}", store.path().display());
    println!("Report directory: {}", config.report_dir(cfg_dir).display());
    println!("Saved scenarios:  {}", scenarios.len());
    println!();
    println!("Model constants:");
    println!(
        "  Automated cost per invoice: {:.2}",
        AUTOMATED_COST_PER_INVOICE
    );
    println!(
        "  Automated error rate:       {}%",
        format_decimal(ERROR_RATE_AUTO * 100.0, 2)
    );
    println!("  ROI boost factor:           {:.2}", MIN_ROI_BOOST_FACTOR);
    println!(
        "  Default horizon:            {} months",
        DEFAULT_TIME_HORIZON_MONTHS
    );

    if !scenarios.is_empty() {
        println!();
        println!("Recent scenarios:");
        for s in scenarios.iter().rev().take(5) {
            println!("  {} - {}", s.scenario_name, s.id);
        }
    }

    Ok(())
}

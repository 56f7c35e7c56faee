// Entry point and high-level CLI flow.
//
// The dataset is loaded exactly once. Without `--interactive` the program
// filters with the command-line flags, prints the dashboard and exits. With
// it, a numbered menu lets the user change filters; every change recomputes
// the whole dashboard from the base dataset.
use chrono::NaiveDate;
use clap::Parser;
use env_logger::Env;
use log::{debug, error};
use once_cell::sync::OnceCell;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use ride_insights::config::Cli;
use ride_insights::dashboard::{self, Dashboard, Tab};
use ride_insights::filter::{self, FilterCriteria};
use ride_insights::types::{Dataset, SummaryStats};
use ride_insights::{loader, output, reports, util};

// Written once after a successful load and only read afterwards, so every
// filtered view can borrow from it for the rest of the process.
static DATASET: OnceCell<Dataset> = OnceCell::new();

/// Print `label` and read one trimmed line from stdin. `None` at end of input.
fn prompt(label: &str) -> Option<String> {
    print!("{}", label);
    let _ = io::stdout().flush();
    util::read_answer(&mut io::stdin().lock())
}

fn read_choice() -> Option<String> {
    prompt("Enter choice: ")
}

/// Filter the base dataset and rebuild every tab.
fn recompute(dataset: &'static Dataset, criteria: &FilterCriteria) -> Dashboard {
    let rows = filter::apply(dataset.records(), criteria);
    debug!("filter kept {} of {} rows", rows.len(), dataset.len());
    dashboard::build(&rows)
}

fn summarize(dataset: &'static Dataset, criteria: &FilterCriteria) -> SummaryStats {
    reports::summarize(&filter::apply(dataset.records(), criteria))
}

/// Ask for a date, keeping `current` on a blank answer or closed input.
fn prompt_date(label: &str, current: NaiveDate) -> NaiveDate {
    loop {
        let answer = match prompt(&format!("{} [{}]: ", label, current)) {
            Some(a) if !a.is_empty() => a,
            _ => return current,
        };
        match NaiveDate::parse_from_str(&answer, "%Y-%m-%d") {
            Ok(d) => return d,
            Err(_) => println!("Invalid date. Please use YYYY-MM-DD."),
        }
    }
}

/// Multi-select over `options`; a blank answer or closed input keeps `current`.
fn prompt_selection(
    label: &str,
    options: &[String],
    current: &BTreeSet<String>,
) -> BTreeSet<String> {
    println!("{}:", label);
    for (i, opt) in options.iter().enumerate() {
        let mark = if current.contains(opt) { "x" } else { " " };
        println!("  [{}] {} {}", mark, i + 1, opt);
    }
    loop {
        let answer = match prompt("Numbers separated by commas, 'all', or blank to keep: ") {
            Some(a) if !a.is_empty() => a,
            _ => return current.clone(),
        };
        match util::parse_selection(&answer, options) {
            Ok(selected) => return selected,
            Err(e) => println!("Invalid selection: {}", e),
        }
    }
}

fn prompt_tab() -> Option<Tab> {
    for (i, tab) in Tab::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, tab);
    }
    let choice = read_choice()?;
    let tab = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| Tab::ALL.get(i).copied());
    if tab.is_none() {
        println!("Invalid choice. Please enter 1 to {}.\n", Tab::ALL.len());
    }
    tab
}

fn handle_export(
    cli: &Cli,
    dashboard: &Dashboard,
    dataset: &'static Dataset,
    criteria: &FilterCriteria,
) {
    let dir = cli
        .export_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("dashboard_export"));
    match output::export_dashboard(&dir, dashboard, &summarize(dataset, criteria)) {
        Ok(paths) => println!(
            "Exported {} files to {}\n",
            util::format_int(paths.len()),
            dir.display()
        ),
        Err(e) => {
            error!("export to {} failed: {}", dir.display(), e);
            eprintln!("Write error: {}\n", e);
        }
    }
}

fn run_interactive(cli: &Cli, dataset: &'static Dataset) {
    let mut criteria = cli.criteria(dataset);
    let mut dash = recompute(dataset, &criteria);
    output::print_status(&dash, &criteria.summary(dataset));

    loop {
        println!("[1] Set date range");
        println!("[2] Select vehicle types");
        println!("[3] Select payment methods");
        println!("[4] Reset filters");
        println!("[5] View a tab");
        println!("[6] View all tabs");
        println!("[7] Export dashboard");
        println!("[0] Exit\n");

        // closed stdin counts as [0]
        let choice = read_choice().unwrap_or_else(|| "0".to_string());
        let changed = match choice.as_str() {
            "1" => {
                criteria.start_date = prompt_date("Start date", criteria.start_date);
                criteria.end_date = prompt_date("End date", criteria.end_date);
                true
            }
            "2" => {
                criteria.vehicle_types = prompt_selection(
                    "Vehicle types",
                    &dataset.vehicle_types(),
                    &criteria.vehicle_types,
                );
                true
            }
            "3" => {
                criteria.payment_methods = prompt_selection(
                    "Payment methods",
                    &dataset.payment_methods(),
                    &criteria.payment_methods,
                );
                true
            }
            "4" => {
                criteria = FilterCriteria::defaults(dataset);
                true
            }
            "5" => {
                println!();
                if let Some(view) = prompt_tab().and_then(|t| dash.tab(t)) {
                    println!();
                    output::print_tab(view, cli.preview_rows);
                }
                false
            }
            "6" => {
                println!();
                output::print_summary(&summarize(dataset, &criteria));
                output::print_dashboard(&dash, cli.preview_rows);
                false
            }
            "7" => {
                handle_export(cli, &dash, dataset, &criteria);
                false
            }
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter a number from 0 to 7.\n");
                false
            }
        };

        if changed {
            println!();
            dash = recompute(dataset, &criteria);
            output::print_status(&dash, &criteria.summary(dataset));
        }
    }
}

fn run_once(cli: &Cli, dataset: &'static Dataset) -> ExitCode {
    let criteria = cli.criteria(dataset);
    let dash = recompute(dataset, &criteria);
    let summary = summarize(dataset, &criteria);
    output::print_status(&dash, &criteria.summary(dataset));
    output::print_summary(&summary);

    match cli.tab.and_then(|t| dash.tab(t)) {
        Some(view) => output::print_tab(view, cli.preview_rows),
        None => output::print_dashboard(&dash, cli.preview_rows),
    }

    if let Some(dir) = &cli.export_dir {
        match output::export_dashboard(dir, &dash, &summary) {
            Ok(paths) => println!(
                "(Dashboard exported to {}: {} files)",
                dir.display(),
                paths.len()
            ),
            Err(e) => {
                error!("export to {} failed: {}", dir.display(), e);
                eprintln!("Write error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let (data, load_report) = match loader::load(&cli.source, &cli.sheet) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("load of {} failed: {}", cli.source.display(), e);
            eprintln!("Failed to load {}: {}", cli.source.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let dataset = DATASET.get_or_init(|| data);

    output::print_banner();
    println!(
        "Processing dataset... ({} rows read, {} loaded)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded_rows)
    );
    if load_report.skipped_rows > 0 {
        println!(
            "Note: {} rows skipped due to missing vehicle type, status or customer.",
            util::format_int(load_report.skipped_rows)
        );
    }
    println!();

    if cli.interactive {
        run_interactive(&cli, dataset);
        ExitCode::SUCCESS
    } else {
        run_once(&cli, dataset)
    }
}

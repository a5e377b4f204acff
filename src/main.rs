//! smart-power entry point: CLI wiring, config loading, and mode dispatch.

use std::path::Path;
use std::process;

use smart_power::allocation::{AllocationRequest, allocate, check_request};
use smart_power::auth::ensure_registered;
use smart_power::cli::{self, CliOptions};
use smart_power::config::AppConfig;
use smart_power::io::export::export_csv;
use smart_power::logging::init_tracing;
use smart_power::report::{ChartBar, UsageReport, render_bar_chart, write_table};
use smart_power::store::{ConsumptionRow, RecordStore};

/// Width of the text bar chart in terminal cells.
const CHART_WIDTH: usize = 40;

fn load_config(path: Option<&Path>) -> AppConfig {
    let cfg = match path {
        Some(p) => AppConfig::from_toml_file(p).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        }),
        None => AppConfig::default(),
    };

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

/// Allocates the requested reading, prints the report, and records it when
/// a user is given. Returns the report and its rows.
fn run_allocation(
    cli: &CliOptions,
    cfg: &AppConfig,
    store: &dyn RecordStore,
) -> (UsageReport, Vec<ConsumptionRow>) {
    let request = AllocationRequest {
        lines: cli.appliances.clone(),
        total_energy: cli.total_energy.unwrap_or(0.0),
    };
    if let Err(e) = check_request(&request) {
        eprintln!("error: {e}");
        process::exit(1);
    }
    if let Some(ref user) = cli.user {
        if let Err(e) = ensure_registered(store, user) {
            eprintln!("error: cannot record allocation: {e}");
            process::exit(1);
        }
    }

    let catalog = cfg.catalog();
    for line in &request.lines {
        if !catalog.contains(&line.name) {
            tracing::warn!(appliance = %line.name, "appliance not in catalog, weighted as 0 W");
        }
    }

    let result = allocate(&catalog, &request);
    let rows = ConsumptionRow::from_result(&result);
    let report = UsageReport::new(&result, &cfg.report_settings());

    println!("{report}");
    println!("\nUsage visualization:");
    print!("{}", render_bar_chart(&report.chart_series(), CHART_WIDTH));

    if let Some(ref user) = cli.user {
        if let Err(e) = store.append_rows(user, &rows) {
            eprintln!("error: failed to record allocation: {e}");
            process::exit(1);
        }
        tracing::info!(user_id = %user, lines = rows.len(), "allocation recorded");
    }

    (report, rows)
}

fn print_history(user: &str, store: &dyn RecordStore) -> Vec<ConsumptionRow> {
    let rows = store.query_rows(user).unwrap_or_else(|e| {
        eprintln!("error: failed to read history: {e}");
        process::exit(1);
    });

    println!("\nPrevious usage records for {user}:");
    if rows.is_empty() {
        println!("(none)");
        return rows;
    }

    let mut table = String::new();
    let _ = write_table(
        &mut table,
        rows.iter().map(|r| (r.appliance.as_str(), r.quantity, r.share_kwh)),
    );
    print!("{table}");
    println!("\nPast power usage:");
    print!("{}", render_bar_chart(&ChartBar::from_rows(&rows), CHART_WIDTH));
    rows
}

#[cfg(feature = "api")]
fn serve(cli: &CliOptions, cfg: &AppConfig) -> ! {
    use std::net::{IpAddr, SocketAddr};
    use std::sync::Arc;

    use smart_power::api::{self, AppState};

    let host: IpAddr = cfg.server.host.parse().unwrap_or_else(|e| {
        eprintln!("config error: server.host: {e}");
        process::exit(1);
    });
    let addr = SocketAddr::new(host, cli.port.unwrap_or(cfg.server.port));

    let state = AppState::from_config(cfg).unwrap_or_else(|e| {
        eprintln!("error: failed to open record store: {e}");
        process::exit(1);
    });

    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    if let Err(e) = rt.block_on(api::serve(Arc::new(state), addr)) {
        eprintln!("error: server failed on {addr}: {e}");
        process::exit(1);
    }
    process::exit(0);
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });
    init_tracing(cli.verbose);

    let cfg = load_config(cli.config.as_deref());

    #[cfg(feature = "api")]
    if cli.serve {
        serve(&cli, &cfg);
    }

    if cli.appliances.is_empty() && !cli.history {
        eprintln!("error: nothing to do");
        cli::print_usage();
        process::exit(1);
    }

    let store = cfg.open_store().unwrap_or_else(|e| {
        eprintln!("error: failed to open record store: {e}");
        process::exit(1);
    });

    let allocation =
        (!cli.appliances.is_empty()).then(|| run_allocation(&cli, &cfg, store.as_ref()));
    let mut displayed = allocation
        .as_ref()
        .map(|(_, rows)| rows.clone())
        .unwrap_or_default();

    if let (true, Some(user)) = (cli.history, cli.user.as_deref()) {
        displayed = print_history(user, store.as_ref());
    }

    if let Some(ref path) = cli.report_out {
        if let Err(e) = export_csv(&displayed, path) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Report written to {}", path.display());
    }

    #[cfg(feature = "tui")]
    if cli.tui {
        if let Some((report, _)) = allocation {
            if let Err(e) = smart_power::tui::run(report) {
                eprintln!("error: TUI crashed: {e}");
                process::exit(1);
            }
        }
    }
}

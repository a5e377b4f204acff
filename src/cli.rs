//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

use crate::allocation::ApplianceLine;

/// Parsed CLI arguments.
#[derive(Debug, Default)]
pub struct CliOptions {
    /// TOML configuration file.
    pub config: Option<PathBuf>,
    /// Appliances to allocate across, in the order given.
    pub appliances: Vec<ApplianceLine>,
    /// Total meter reading in kWh.
    pub total_energy: Option<f64>,
    /// User whose history is read or appended to.
    pub user: Option<String>,
    /// Print the user's stored history.
    pub history: bool,
    /// Write the displayed rows as CSV.
    pub report_out: Option<PathBuf>,
    pub verbose: bool,
    #[cfg(feature = "api")]
    pub serve: bool,
    #[cfg(feature = "api")]
    pub port: Option<u16>,
    #[cfg(feature = "tui")]
    pub tui: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(&args)
}

/// Parses arguments (without the program name).
///
/// # Errors
///
/// Returns a message naming the offending argument.
pub fn parse_args_from(args: &[String]) -> Result<CliOptions, String> {
    let mut opts = CliOptions::default();
    let mut i = 0usize;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if opts.config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--appliance" | "-a" => {
                i += 1;
                let arg = args.next_or_err(
                    i,
                    "missing value for --appliance (expected NAME or NAME=QTY)",
                )?;
                opts.appliances.push(parse_appliance(arg)?);
            }
            "--total" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --total (expected kWh)")?;
                let total = raw
                    .parse::<f64>()
                    .map_err(|_| format!("--total value \"{raw}\" is not a number"))?;
                if opts.total_energy.replace(total).is_some() {
                    return Err("--total provided more than once".to_string());
                }
            }
            "--user" => {
                i += 1;
                let user = args.next_or_err(i, "missing value for --user (expected a user id)")?;
                if opts.user.replace(user.to_string()).is_some() {
                    return Err("--user provided more than once".to_string());
                }
            }
            "--history" => opts.history = true,
            "--report-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --report-out (expected a file path)",
                )?;
                if opts.report_out.replace(PathBuf::from(path)).is_some() {
                    return Err("--report-out provided more than once".to_string());
                }
            }
            "--verbose" | "-v" => opts.verbose = true,
            #[cfg(feature = "api")]
            "--serve" => opts.serve = true,
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let port = raw
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{raw}\" is not a valid u16"))?;
                opts.port = Some(port);
            }
            #[cfg(feature = "tui")]
            "--tui" => opts.tui = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if !opts.appliances.is_empty() && opts.total_energy.is_none() {
        return Err("--appliance requires --total".to_string());
    }
    if opts.appliances.is_empty() && opts.total_energy.is_some() {
        return Err("--total requires at least one --appliance".to_string());
    }
    if opts.history && opts.user.is_none() {
        return Err("--history requires --user".to_string());
    }
    #[cfg(feature = "tui")]
    if opts.tui && opts.appliances.is_empty() {
        return Err("--tui requires an allocation (--appliance and --total)".to_string());
    }

    Ok(opts)
}

/// Parses `NAME` or `NAME=QTY`. The quantity defaults to 1.
///
/// Splits on the last `=` so names may contain `=`.
fn parse_appliance(arg: &str) -> Result<ApplianceLine, String> {
    let (name, quantity) = match arg.rsplit_once('=') {
        Some((name, qty)) => {
            let quantity = qty
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("--appliance quantity \"{qty}\" is not a whole number"))?;
            (name.trim(), quantity)
        }
        None => (arg.trim(), 1),
    };
    if name.is_empty() {
        return Err(format!("--appliance \"{arg}\" has no name"));
    }
    Ok(ApplianceLine::new(name, quantity))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("smart-power: split a meter reading across household appliances");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  smart-power [--config <path>] --appliance <NAME[=QTY]>... --total <kWh>");
    eprintln!("              [--user <id>] [--report-out <path>]");
    eprintln!("  smart-power [--config <path>] --user <id> --history [--report-out <path>]");
    #[cfg(feature = "api")]
    eprintln!("  smart-power [--config <path>] --serve [--port <u16>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load settings from a TOML file");
    eprintln!("  --appliance <NAME=QTY>   Add an appliance line (repeatable, QTY defaults to 1)");
    eprintln!("  --total <kWh>            Total EB reading to split");
    eprintln!("  --user <id>              Record the allocation under this registered user");
    eprintln!("  --history                Print the user's previous records");
    eprintln!("  --report-out <path>      Write the displayed rows as CSV");
    eprintln!("  --verbose                Debug logging");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start the REST API server");
        eprintln!("  --port <u16>             Override the configured server port");
    }
    #[cfg(feature = "tui")]
    eprintln!("  --tui                    Show the allocation in a terminal dashboard");
    eprintln!("  --help                   Show this help message");
}

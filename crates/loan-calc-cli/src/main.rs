mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::capacity::CapacityArgs;
use commands::consolidation::ConsolidationArgs;
use commands::gate::GateArgs;
use commands::leasing::LeasingArgs;
use commands::loans::{AmortizeArgs, CarLoanArgs, CashLoanArgs, MortgageArgs};
use config::CliConfig;

/// Loan, leasing and credit capacity calculations
#[derive(Parser)]
#[command(
    name = "lcalc",
    version,
    about = "Loan, leasing and credit capacity calculations",
    long_about = "A CLI for consumer finance estimates with decimal precision. \
                  Supports annuity schedules, mortgages, cash and car loans, \
                  debt consolidation, operating leases and borrowing capacity, \
                  with an optional usage quota unlocked by leaving contact details."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Gate settings file (YAML or JSON)
    #[arg(long, global = true, env = "LCALC_CONFIG")]
    config: Option<String>,

    /// Count calculator runs against the usage quota
    #[arg(long, global = true)]
    gated: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-payment amortization schedule
    Amortize(AmortizeArgs),
    /// Mortgage instalment, LTV and schedule
    Mortgage(MortgageArgs),
    /// Consumer cash loan
    CashLoan(CashLoanArgs),
    /// Car loan
    CarLoan(CarLoanArgs),
    /// Compare existing loans against one consolidation loan
    Consolidation(ConsolidationArgs),
    /// Operating lease with tax shield
    Leasing(LeasingArgs),
    /// Borrowing capacity from a household budget
    Capacity(CapacityArgs),
    /// Inspect or unlock the usage quota
    Gate(GateArgs),
    /// Print version information
    Version,
}

impl Commands {
    fn is_calculator(&self) -> bool {
        !matches!(self, Commands::Gate(_) | Commands::Version)
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let config = CliConfig::load(cli.config.as_deref())?;

    if cli.gated && cli.command.is_calculator() {
        commands::gate::enforce(&config)?;
    }

    match cli.command {
        Commands::Amortize(args) => commands::loans::run_amortize(args),
        Commands::Mortgage(args) => commands::loans::run_mortgage(args),
        Commands::CashLoan(args) => commands::loans::run_cash_loan(args),
        Commands::CarLoan(args) => commands::loans::run_car_loan(args),
        Commands::Consolidation(args) => commands::consolidation::run_consolidation(args),
        Commands::Leasing(args) => commands::leasing::run_leasing(args),
        Commands::Capacity(args) => commands::capacity::run_capacity(args),
        Commands::Gate(args) => commands::gate::run_gate(args, &config),
        Commands::Version => Ok(serde_json::json!({
            "lcalc": env!("CARGO_PKG_VERSION"),
        })),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let format = cli.output.clone();
    match run(cli) {
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

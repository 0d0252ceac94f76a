//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::transaction_log_adapter::TransactionLogAdapter;
use crate::domain::config::{build_engine_config, build_periods_per_year, build_strategy};
use crate::domain::engine::run_backtest;
use crate::domain::error::SigtraderError;
use crate::domain::metrics::Metrics;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Signal-driven trading strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override the configured transaction log path
        #[arg(short, long)]
        transactions: Option<PathBuf>,
    },
    /// Validate a configuration without running
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the data range of the configured price file
    Info {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            transactions,
        } => run_backtest_command(&config, transactions.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config } => run_info(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(&e)
        }
    }
}

fn csv_path(config: &dyn ConfigPort) -> Result<PathBuf, SigtraderError> {
    config
        .get_string("data", "csv_path")
        .map(PathBuf::from)
        .ok_or_else(|| SigtraderError::ConfigMissing {
            section: "data".into(),
            key: "csv_path".into(),
        })
}

fn run_backtest_command(
    config_path: &Path,
    transactions_override: Option<&Path>,
) -> Result<(), SigtraderError> {
    eprintln!("Loading config from {}", config_path.display());
    let config = FileConfigAdapter::from_file(config_path)?;

    let engine_config = build_engine_config(&config)?;
    let strategy = build_strategy(&config)?;
    let periods_per_year = build_periods_per_year(&config)?;

    let data_path = csv_path(&config)?;
    eprintln!("Loading bars from {}", data_path.display());
    let bars = CsvAdapter::new(data_path.clone()).load_bars()?;
    if bars.is_empty() {
        return Err(SigtraderError::NoData {
            path: data_path.display().to_string(),
        });
    }

    eprintln!("Running {} over {} bars", strategy.name(), bars.len());
    let signals = strategy.compute_signals(&bars);
    let result = run_backtest(&bars, &signals, &engine_config)?;
    let metrics = Metrics::compute(&result.ledger, periods_per_year);

    let first = bars[0].timestamp;
    let last = bars[bars.len() - 1].timestamp;
    let final_equity = result
        .ledger
        .last()
        .map(|row| row.total)
        .unwrap_or(engine_config.initial_capital);

    println!("Strategy:       {}", strategy.name());
    println!(
        "Bars:           {} ({} .. {})",
        bars.len(),
        first.format("%Y-%m-%d %H:%M:%S"),
        last.format("%Y-%m-%d %H:%M:%S")
    );
    println!("Transactions:   {}", result.transactions.len());
    println!("Final equity:   {:.2}", final_equity);
    println!(
        "Total return:   {:.2}%",
        (final_equity / engine_config.initial_capital - 1.0) * 100.0
    );
    println!("CAGR:           {:.2}%", metrics.cagr * 100.0);
    println!("Sharpe ratio:   {:.2}", metrics.sharpe_ratio);
    println!("Max drawdown:   {:.2}%", metrics.max_drawdown * 100.0);

    let log_path = transactions_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "transactions_path").map(PathBuf::from));
    if let Some(path) = log_path {
        TransactionLogAdapter::new().write(&result.transactions, &path)?;
        eprintln!("Wrote {} transactions to {}", result.transactions.len(), path.display());
    }

    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SigtraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;

    build_engine_config(&config)?;
    let strategy = build_strategy(&config)?;
    build_periods_per_year(&config)?;
    csv_path(&config)?;

    println!("Configuration OK (strategy: {})", strategy.name());
    Ok(())
}

fn run_info(config_path: &Path) -> Result<(), SigtraderError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let data_path = csv_path(&config)?;

    match CsvAdapter::new(data_path.clone()).data_range()? {
        Some((first, last, count)) => {
            println!("File:  {}", data_path.display());
            println!("Bars:  {}", count);
            println!("First: {}", first.format("%Y-%m-%d %H:%M:%S"));
            println!("Last:  {}", last.format("%Y-%m-%d %H:%M:%S"));
            Ok(())
        }
        None => Err(SigtraderError::NoData {
            path: data_path.display().to_string(),
        }),
    }
}

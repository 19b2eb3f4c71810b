//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{CsvReportAdapter, SUMMARY_FILE, TRADE_LOG_FILE};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestRun};
use crate::domain::config_validation::{
    read_date, read_kind, read_number, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::BacktestError;
use crate::domain::metrics::SummaryRecord;
use crate::domain::price::PriceBar;
use crate::domain::simulation::{simulate, DEFAULT_INITIAL_CASH};
use crate::domain::strategy::{
    Strategy, StrategyKind, DEFAULT_EMA_WINDOW, DEFAULT_RSI_BUY, DEFAULT_RSI_EXIT,
    DEFAULT_RSI_WINDOW, DEFAULT_SMA_WINDOW,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_OUTPUT_DIR: &str = "reports";

#[derive(Parser, Debug)]
#[command(name = "strategy-gamble", about = "Single-asset long-only strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a strategy over a price series
    Backtest(BacktestArgs),
    /// Simulate a precomputed Position column
    Simulate {
        #[arg(short, long)]
        prices: PathBuf,
        #[arg(long)]
        initial_capital: Option<f64>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        no_reports: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List tickers with a CSV in the data directory
    ListSymbols {
        #[arg(long, default_value = DEFAULT_DATA_DIR)]
        data_dir: PathBuf,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct BacktestArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub prices: Option<PathBuf>,
    #[arg(short, long)]
    pub strategy: Option<StrategyKind>,
    #[arg(long)]
    pub initial_capital: Option<f64>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub no_reports: bool,
}

/// Where a run's prices come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceSource {
    File(PathBuf),
    Symbol { data_dir: PathBuf, code: String },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest(args) => run_backtest_command(&args),
        Command::Simulate {
            prices,
            initial_capital,
            output,
            no_reports,
        } => run_simulate(&prices, initial_capital, output.as_deref(), no_reports),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { data_dir } => run_list_symbols(&data_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BacktestError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    debug!(path = %path.display(), "config loaded");
    Ok(adapter)
}

/// Read `[backtest]` and `[strategy]` into a run configuration.
pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, BacktestError> {
    validate_backtest_config(adapter)?;
    validate_strategy_config(adapter)?;

    Ok(BacktestConfig {
        initial_capital: read_number::<f64>(adapter, "backtest", "initial_capital")?
            .unwrap_or(DEFAULT_INITIAL_CASH),
        strategy: build_strategy(adapter, None)?,
        start_date: read_date(adapter, "start_date")?,
        end_date: read_date(adapter, "end_date")?,
    })
}

/// Build the strategy named by `kind` (or `[strategy] kind`), filling unset
/// parameters with defaults.
pub fn build_strategy(
    adapter: &dyn ConfigPort,
    kind: Option<StrategyKind>,
) -> Result<Strategy, BacktestError> {
    let kind = match kind {
        Some(k) => k,
        None => read_kind(adapter)?,
    };

    let strategy = match kind {
        StrategyKind::SmaEma => Strategy::SmaEma {
            sma_window: read_number::<usize>(adapter, "strategy", "sma_window")?
                .unwrap_or(DEFAULT_SMA_WINDOW),
            ema_window: read_number::<usize>(adapter, "strategy", "ema_window")?
                .unwrap_or(DEFAULT_EMA_WINDOW),
        },
        StrategyKind::Rsi => Strategy::Rsi {
            window: read_number::<usize>(adapter, "strategy", "rsi_window")?
                .unwrap_or(DEFAULT_RSI_WINDOW),
            buy: read_number::<f64>(adapter, "strategy", "rsi_buy")?.unwrap_or(DEFAULT_RSI_BUY),
            exit: read_number::<f64>(adapter, "strategy", "rsi_exit")?.unwrap_or(DEFAULT_RSI_EXIT),
        },
    };

    strategy.validate()?;
    Ok(strategy)
}

/// Apply command-line overrides on top of a config-derived run.
pub fn apply_overrides(
    mut config: BacktestConfig,
    args: &BacktestArgs,
    adapter: &dyn ConfigPort,
) -> Result<BacktestConfig, BacktestError> {
    if let Some(kind) = args.strategy {
        config.strategy = build_strategy(adapter, Some(kind))?;
    }
    if let Some(capital) = args.initial_capital {
        if !(capital.is_finite() && capital > 0.0) {
            return Err(BacktestError::InvalidParameter {
                name: "initial_capital".into(),
                reason: format!("{} is not a positive amount", capital),
            });
        }
        config.initial_capital = capital;
    }
    Ok(config)
}

/// Flags win over config; an explicit file wins over a data directory.
pub fn resolve_price_source(
    args: &BacktestArgs,
    adapter: &dyn ConfigPort,
) -> Result<PriceSource, BacktestError> {
    if let Some(path) = &args.prices {
        return Ok(PriceSource::File(path.clone()));
    }

    let config_code = adapter
        .get_string("backtest", "code")
        .filter(|s| !s.trim().is_empty());
    let config_dir = adapter
        .get_string("backtest", "data_dir")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);
    let data_dir = || {
        args.data_dir
            .clone()
            .or_else(|| config_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    };

    if args.code.is_some() || args.data_dir.is_some() {
        let code = args
            .code
            .clone()
            .or(config_code)
            .ok_or_else(|| BacktestError::ConfigMissing {
                section: "backtest".into(),
                key: "code".into(),
            })?;
        return Ok(PriceSource::Symbol {
            data_dir: data_dir(),
            code,
        });
    }

    if let Some(path) = adapter
        .get_string("backtest", "prices")
        .filter(|s| !s.trim().is_empty())
    {
        return Ok(PriceSource::File(PathBuf::from(path.trim())));
    }

    match config_code {
        Some(code) => Ok(PriceSource::Symbol {
            data_dir: data_dir(),
            code,
        }),
        None => Err(BacktestError::ConfigMissing {
            section: "backtest".into(),
            key: "prices".into(),
        }),
    }
}

pub fn load_prices(
    source: &PriceSource,
    config: &BacktestConfig,
) -> Result<Vec<PriceBar>, BacktestError> {
    match source {
        PriceSource::File(path) => CsvAdapter::read_file(path, config.start_date, config.end_date),
        PriceSource::Symbol { data_dir, code } => {
            fetch_symbol(&CsvAdapter::new(data_dir.clone()), code, config)
        }
    }
}

pub fn fetch_symbol(
    data_port: &dyn DataPort,
    code: &str,
    config: &BacktestConfig,
) -> Result<Vec<PriceBar>, BacktestError> {
    data_port.fetch_prices(code, config.start_date, config.end_date)
}

/// Run the backtest and, when `output_dir` is given, persist its reports.
pub fn run_backtest_pipeline(
    bars: &[PriceBar],
    bt_config: &BacktestConfig,
    reporter: &dyn ReportPort,
    output_dir: Option<&Path>,
) -> Result<BacktestRun, BacktestError> {
    let run = run_backtest(bars, bt_config)?;
    if let Some(dir) = output_dir {
        let written = reporter.write(&run, dir)?;
        eprintln!("Reports written to {} ({} files)", dir.display(), written.len());
    }
    Ok(run)
}

fn run_backtest_command(args: &BacktestArgs) -> Result<(), BacktestError> {
    let adapter = match &args.config {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            load_config(path)?
        }
        None => FileConfigAdapter::empty(),
    };

    let bt_config = build_backtest_config(&adapter)?;
    let bt_config = apply_overrides(bt_config, args, &adapter)?;
    eprintln!("Strategy: {}", bt_config.strategy);

    let source = resolve_price_source(args, &adapter)?;
    let bars = load_prices(&source, &bt_config)?;
    eprintln!("Loaded {} bars", bars.len());

    let output_dir = output_dir(args.output.as_deref(), &adapter);
    let save = !args.no_reports && adapter.get_bool("backtest", "save_reports", true);

    let run = run_backtest_pipeline(
        &bars,
        &bt_config,
        &CsvReportAdapter::new(),
        save.then_some(output_dir.as_path()),
    )?;
    print_summary(&run.summary);
    Ok(())
}

fn run_simulate(
    prices: &Path,
    initial_capital: Option<f64>,
    output: Option<&Path>,
    no_reports: bool,
) -> Result<(), BacktestError> {
    let (bars, positions) = CsvAdapter::read_positions(prices)?;
    eprintln!("Loaded {} bars with positions", bars.len());

    let sim = simulate(&bars, &positions, initial_capital.unwrap_or(DEFAULT_INITIAL_CASH))?;
    let summary = SummaryRecord::from_simulation(&sim)?;

    if !no_reports {
        let dir = output.unwrap_or(Path::new(DEFAULT_OUTPUT_DIR));
        std::fs::create_dir_all(dir)?;
        CsvReportAdapter::write_trade_log(&sim.trades, &dir.join(TRADE_LOG_FILE))?;
        CsvReportAdapter::write_summary(&summary, &dir.join(SUMMARY_FILE))?;
        eprintln!("Reports written to {}", dir.display());
    }
    print_summary(&summary);
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BacktestError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter)?;

    eprintln!("\nStrategy: {} ({})", bt_config.strategy, bt_config.strategy.kind());
    eprintln!("Initial capital: {:.2}", bt_config.initial_capital);
    if let Some(start) = bt_config.start_date {
        eprintln!("Start date: {}", start);
    }
    if let Some(end) = bt_config.end_date {
        eprintln!("End date: {}", end);
    }
    match resolve_price_source(&BacktestArgs::default(), &adapter) {
        Ok(PriceSource::File(path)) => eprintln!("Prices: {}", path.display()),
        Ok(PriceSource::Symbol { data_dir, code }) => {
            eprintln!("Prices: {} in {}", code, data_dir.display())
        }
        Err(_) => eprintln!("Prices: not configured (pass --prices or --code)"),
    }

    eprintln!("\nConfiguration is valid");
    Ok(())
}

fn run_list_symbols(data_dir: &Path) -> Result<(), BacktestError> {
    let symbols = CsvAdapter::new(data_dir.to_path_buf()).list_symbols()?;
    if symbols.is_empty() {
        eprintln!("No symbols found in {}", data_dir.display());
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn output_dir(flag: Option<&Path>, adapter: &dyn ConfigPort) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| adapter.get_string("backtest", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

pub fn format_summary(summary: &SummaryRecord) -> String {
    let r = summary.rounded();
    format!(
        "Initial Capital:       {:.2}\n\
         Final Portfolio Value: {:.2}\n\
         Total Return (%):      {:.2}\n\
         Sharpe Ratio:          {:.2}\n\
         Max Drawdown (%):      {:.2}\n\
         Total Trades:          {}",
        r.initial_capital,
        r.final_value,
        r.total_return_pct,
        r.sharpe_ratio,
        r.max_drawdown_pct,
        r.trade_count
    )
}

fn print_summary(summary: &SummaryRecord) {
    eprintln!("\n{}", format_summary(summary));
}

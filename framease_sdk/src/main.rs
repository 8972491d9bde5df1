//! # framease CLI
//!
//! Parse configuration dumps, inspect the plugin catalog, list compatible
//! suites for a device, and execute a suite against a device.

use clap::{Args, Parser, Subcommand, ValueEnum};
use framease_base::prelude::*;
use framease_parser::config::ParserPreferences;
use framease_parser::logging::{
    self, ConsoleLogger, LogEvent, LogLevel, Logger, LoggingService, StructuredLogger,
};
use framease_parser::{log_error, log_info, HierarchyParser};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "framease",
    version,
    about = "Configuration compliance checks for FortiGate devices"
)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Console, global = true)]
    log_format: LogFormat,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human readable lines
    Console,
    /// One JSON document per event
    Json,
    /// Forward to the `log` facade, filtered by `RUST_LOG`
    Env,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a configuration dump and print it as JSON
    Parse(ParseArgs),
    /// List registered plugins with their tags and parameters
    Plugins,
    /// List the suites a device can run
    Compatible(CompatibleArgs),
    /// Execute a suite against a device
    Run(RunArgs),
}

#[derive(Args)]
struct ParseArgs {
    file: PathBuf,

    /// Print the flat `path|set key` log instead of the hierarchy
    #[arg(long)]
    flat: bool,
}

#[derive(Args)]
struct CompatibleArgs {
    /// Device data-source configuration (JSON)
    #[arg(long)]
    device: PathBuf,

    /// Array of test suites (JSON)
    #[arg(long)]
    suites: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    /// Device data-source configuration (JSON)
    #[arg(long)]
    device: PathBuf,

    /// Test suite (JSON)
    #[arg(long)]
    suite: PathBuf,

    /// Existing run record to continue (JSON)
    #[arg(long)]
    run: Option<PathBuf>,

    /// Reviewer comments for the run (JSON array)
    #[arg(long)]
    comments: Option<PathBuf>,

    /// Where to write the updated run record
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Forwards coded events onto the `log` facade
struct LogCrateBridge;

impl Logger for LogCrateBridge {
    fn log(&self, event: &LogEvent) {
        let level = match event.level {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warning => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
        };
        log::log!(target: "framease", level, "{}", event.format());
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    }
    .with_env_overrides();

    init_logging(cli.log_format, &config)?;
    log_info!("framease starting", "consumer" => &config.consumer_id);

    match cli.command {
        Commands::Parse(args) => parse_command(&args, &config),
        Commands::Plugins => plugins_command(&config),
        Commands::Compatible(args) => compatible_command(&args, &config),
        Commands::Run(args) => run_command(&args, config),
    }
}

fn init_logging(format: LogFormat, config: &EngineConfig) -> Result<(), String> {
    let mut min_level = logging::config::get_min_log_level();
    if config.debug_logging {
        min_level = LogLevel::Debug;
    }

    let service = match format {
        LogFormat::Console => LoggingService::new(Arc::new(ConsoleLogger::new(min_level)), min_level),
        LogFormat::Json => {
            LoggingService::new(Arc::new(StructuredLogger::new(min_level)), min_level)
        }
        LogFormat::Env => {
            let default_filter = if config.debug_logging { "debug" } else { "info" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
                .init();
            let bridged = match log::max_level() {
                log::LevelFilter::Trace | log::LevelFilter::Debug => LogLevel::Debug,
                log::LevelFilter::Info => LogLevel::Info,
                log::LevelFilter::Warn => LogLevel::Warning,
                log::LevelFilter::Error | log::LevelFilter::Off => LogLevel::Error,
            };
            LoggingService::new(Arc::new(LogCrateBridge), bridged)
        }
    };

    logging::init_global_logging_with_service(Arc::new(service))
}

fn parse_command(args: &ParseArgs, config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let path = path_str(&args.file)?;
    let loaded = config.file_processor().process_file(path)?;

    let preferences = ParserPreferences {
        keep_flat_log: true,
        ..ParserPreferences::default()
    };
    let hierarchy = HierarchyParser::with_preferences(preferences).parse(&loaded.source)?;

    if args.flat {
        print_json(hierarchy.flat_config())
    } else {
        print_json(&hierarchy.to_capability_json()?)
    }
}

fn plugins_command(config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = framease_sdk::create_plugin_registry_with_timeout(config.command_timeout())?;

    println!("Data sources:");
    for plugin in registry.data_sources() {
        println!("  {}", plugin.name());
        println!("    provides: {}", plugin.provides().join(", "));
        println!("    requires: {}", plugin.requires().join(", "));
    }

    println!("Checks:");
    for plugin in registry.checks() {
        println!("  {}", plugin.name());
        println!("    requires: {}", plugin.requires().join(", "));
        for param in plugin.parameters() {
            println!("    {} {:<18} {}", param.kind, param.name, param.description);
        }
    }

    let stats = registry.get_statistics();
    if !stats.unsatisfiable_checks.is_empty() {
        println!(
            "Unsatisfiable checks: {}",
            stats.unsatisfiable_checks.join(", ")
        );
    }
    Ok(())
}

fn compatible_command(
    args: &CompatibleArgs,
    config: &EngineConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = framease_sdk::create_plugin_registry_with_timeout(config.command_timeout())?;
    let device: DeviceCapabilitySet = read_json(&args.device)?;
    let suites: Vec<TestSuite> = read_json(&args.suites)?;

    let compatible = registry.compatible_suites(&device, &suites);
    log_info!("Compatible suites resolved",
        "device" => &device.device,
        "compatible" => compatible.len(),
        "total" => suites.len());

    for suite in compatible {
        if suite.name.is_empty() {
            println!("{}", suite.id);
        } else {
            println!("{}\t{}", suite.id, suite.name);
        }
    }
    Ok(())
}

fn run_command(args: &RunArgs, config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = framease_sdk::create_plugin_registry_with_timeout(config.command_timeout())?;
    let device: DeviceCapabilitySet = read_json(&args.device)?;
    let suite: TestSuite = read_json(&args.suite)?;
    let run = match &args.run {
        Some(path) => read_json::<ValidationRun>(path)?,
        None => ValidationRun::new(
            format!("{}:{}", device.device, suite.id),
            device.device.clone(),
            suite.id.clone(),
        ),
    };
    let comments: Vec<Comment> = match &args.comments {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };

    let run_id = run.id.clone();
    let store = MemoryRunStore::new();
    store.insert_device(device);
    store.insert_suite(suite);
    store.insert_run(run);
    for comment in comments {
        store.add_comment(&run_id, comment);
    }

    let engine = ValidationEngine::with_config(config, registry, store.clone());
    engine.dispatch(&run_id)?;
    let queued = store.dequeue().unwrap_or_else(|| run_id.clone());

    let outcome = engine.execute(&queued);
    // The terminal state is persisted even when execution failed
    let record = engine.store().fetch_run(&queued)?;
    if let Some(path) = args.output.as_ref().or(args.run.as_ref()) {
        write_json(path, &record)?;
    }

    let report = match outcome {
        Ok(report) => report,
        Err(e) => {
            log_error!(e.error_code(), "Run failed", "run" => &queued, "error" => &e);
            return Err(e.into());
        }
    };

    for row in &report.rows {
        println!(
            "{:>4}  {:<24} {:<10} ({} results)",
            row.sequence, row.plugin, row.status.as_str(), row.result_count
        );
    }
    for error in &report.errors {
        println!("{:>4}  {} [{}] {}", error.sequence, error.plugin, error.code, error.message);
    }
    let summary = report.summary;
    println!(
        "overall: {}  success: {}  failure: {}  incomplete: {}  no data: {}",
        summary.overall(),
        summary.success,
        summary.failure,
        summary.incomplete,
        summary.no_data
    );
    Ok(())
}

fn path_str(path: &Path) -> Result<&str, String> {
    path.to_str()
        .ok_or_else(|| format!("Path is not valid UTF-8: {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e).into())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

//! Data Frame Transform config tool
//!
//! The main entry point for dft-core, handling:
//! - Checking transform configs as the API or the storage layer would
//! - Rendering configs in the API or internal-storage view
//! - Stamping server metadata onto externally supplied configs

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dft_common::{format_error_human, Error, OutputFormat, Result, StructuredError, CONFIG_SCHEMA_VERSION};
use dft_config::{
    decode, encode, ServerMetadata, TransformConfig, TrustLevel, View, CURRENT_VERSION, DOC_TYPE,
};
use dft_core::exit_codes::ExitCode;
use dft_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use dft_core::report::{read_input, CheckReport};
use tracing::{debug, info};

/// Data Frame Transform config tool - validate, render and stamp transform configs
#[derive(Parser)]
#[command(name = "dft-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true, env = "DFT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a config and report whether it is acceptable
    Check(InputArgs),

    /// Decode a config and print it in the requested view
    Render(RenderArgs),

    /// Decode an external config, stamp server metadata, print the stored form
    Stamp(StampArgs),

    /// Print version information
    Version,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Config JSON file, or `-` for stdin
    input: PathBuf,

    /// Id supplied out of band (as in a request URL)
    #[arg(long)]
    id: Option<String>,

    /// Trust level of the payload: external (API) or internal (storage)
    #[arg(long, default_value = "external")]
    trust: TrustLevel,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// View to render: api or internal
    #[arg(long, default_value = "api")]
    view: View,
}

#[derive(Args, Debug)]
struct StampArgs {
    /// Config JSON file, or `-` for stdin
    input: PathBuf,

    /// Id supplied out of band (as in a request URL)
    #[arg(long)]
    id: Option<String>,

    /// Caller header as KEY=VALUE; only security headers are kept
    #[arg(long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
}

fn parse_header(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.global.quiet {
        Some(LogLevel::Off)
    } else {
        LogLevel::from_verbosity(cli.global.verbose)
    };
    let log_config = LogConfig::from_env(log_level, cli.global.log_format)
        .with_source_location(cli.global.verbose >= 2);
    init_logging(&log_config);

    let result = match &cli.command {
        Commands::Check(args) => run_check(&cli.global, args),
        Commands::Render(args) => run_render(&cli.global, args),
        Commands::Stamp(args) => run_stamp(&cli.global, args),
        Commands::Version => {
            print_version(&cli.global);
            Ok(())
        }
    };

    let exit_code = match result {
        Ok(()) => ExitCode::Clean,
        Err(err) => report_error(&cli.global, &err),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn load(args: &InputArgs) -> Result<TransformConfig> {
    let raw = read_input(&args.input)?;
    debug!(input = %args.input.display(), bytes = raw.len(), trust = %args.trust, "decoding config");
    decode(&raw, args.id.as_deref(), args.trust)
}

fn run_check(global: &GlobalOpts, args: &InputArgs) -> Result<()> {
    let config = load(args)?;
    let report = CheckReport::new(&config, args.trust);
    info!(id = %report.id, valid = report.valid, "config checked");

    match global.format {
        OutputFormat::Summary => println!("{}", report.summary_line()),
        _ => emit(global, &serde_json::to_value(&report)?),
    }
    Ok(())
}

fn run_render(global: &GlobalOpts, args: &RenderArgs) -> Result<()> {
    let config = load(&args.input)?;
    let rendered = encode(&config, args.view)?;
    debug!(id = %config.id(), view = %args.view, "config rendered");
    emit(global, &rendered);
    Ok(())
}

fn run_stamp(global: &GlobalOpts, args: &StampArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let config = decode(&raw, args.id.as_deref(), TrustLevel::External)?;

    let caller_headers: BTreeMap<String, String> = args.headers.iter().cloned().collect();
    let stamped = config.with_metadata(ServerMetadata::stamp(&caller_headers))?;
    info!(
        id = %stamped.id(),
        kept_headers = stamped.headers().map_or(0, |h| h.len()),
        "server metadata stamped"
    );

    emit(global, &encode(&stamped, View::InternalStorage)?);
    Ok(())
}

fn print_version(global: &GlobalOpts) {
    match global.format {
        OutputFormat::Summary => println!(
            "dft-core {} (config schema {})",
            env!("CARGO_PKG_VERSION"),
            CONFIG_SCHEMA_VERSION
        ),
        _ => emit(
            global,
            &serde_json::json!({
                "version": env!("CARGO_PKG_VERSION"),
                "config_version": CURRENT_VERSION,
                "config_schema_version": CONFIG_SCHEMA_VERSION,
                "doc_type": DOC_TYPE,
            }),
        ),
    }
}

// ============================================================================
// Output helpers
// ============================================================================

/// Write a JSON payload to stdout. Summary mode falls back to compact JSON.
fn emit(global: &GlobalOpts, value: &serde_json::Value) {
    match global.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        ),
        OutputFormat::Compact | OutputFormat::Summary => println!("{}", value),
    }
}

fn report_error(global: &GlobalOpts, err: &Error) -> ExitCode {
    debug!(code = err.code(), category = %err.category(), "command failed");
    match global.format {
        OutputFormat::Json => println!("{}", StructuredError::from(err).to_json_pretty()),
        OutputFormat::Compact => println!("{}", StructuredError::from(err).to_json()),
        OutputFormat::Summary => {
            let use_color = !global.no_color && std::io::stderr().is_terminal();
            eprintln!("{}", format_error_human(err, use_color));
        }
    }
    ExitCode::from_error(err)
}

//! Bird/Plane Classifier - Sequential Bayesian Inference
//!
//! The main entry point for bp-core, handling:
//! - Batch classification of tracked objects from speed and variation data
//! - Variation data and likelihood generation from labeled training tracks
//! - Speed likelihood training and table checks
//! - Configuration inspection, report schema and shell completions

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io::Write;
use std::path::{Path, PathBuf};

use bp_common::{OutputFormat, RunId, SCHEMA_VERSION};
use bp_config::resolve::load_from;
use bp_config::{load_config, ConfigSnapshot, ConfigSource, ResolvedConfig, ValidationError};
use bp_core::check::check_tables;
use bp_core::classify::{classify_batch, BatchReport, ClassifyInputs, ClassifyOptions};
use bp_core::exit_codes::ExitCode;
use bp_core::log_event;
use bp_core::logging::{
    event_names, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use bp_core::training::{generate_variation, train_speed};

/// Bird/Plane Classifier - decide whether tracked objects are birds or planes
#[derive(Parser)]
#[command(name = "bp-core")]
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
    /// Path to a classifier config file (falls back to BP_CONFIG, then XDG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log line format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a batch of objects from speed and variation data
    Classify(ClassifyArgs),

    /// Generate variation likelihoods and variation data
    GenVar(GenVarArgs),

    /// Build speed likelihoods from labeled training tracks
    TrainSpeed(TrainSpeedArgs),

    /// Validate a pair of likelihood files
    Check(CheckArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print the JSON Schema of the classify report
    Schema,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct ClassifyArgs {
    /// Speed readings, one object per line
    speed_data: PathBuf,

    /// Speed likelihoods (bird line, then plane line)
    speed_likelihoods: PathBuf,

    /// Variation data, one object per line
    variation_data: PathBuf,

    /// Variation likelihoods (bird line, then plane line)
    variation_likelihoods: PathBuf,

    /// Number of objects to classify; 0 classifies every line
    #[arg(long)]
    objects: Option<usize>,

    /// Include the per-step evidence ledger
    #[arg(long)]
    explain: bool,
}

#[derive(Args, Debug)]
struct GenVarArgs {
    /// Labeled speed tracks: bird half first, then plane half
    training_data: PathBuf,

    /// Speed tracks to derive variation data from
    test_data: PathBuf,

    /// Output path for variation data
    variation_data_out: PathBuf,

    /// Output path for variation likelihoods
    variation_likelihoods_out: PathBuf,
}

#[derive(Args, Debug)]
struct TrainSpeedArgs {
    /// Labeled speed tracks: bird half first, then plane half
    training_data: PathBuf,

    /// Output path for speed likelihoods
    out: PathBuf,

    /// Number of speed bins (default: speed.table_width from config)
    #[arg(long)]
    width: Option<usize>,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Speed likelihoods
    speed_likelihoods: PathBuf,

    /// Variation likelihoods
    variation_likelihoods: PathBuf,

    /// Treat warnings as failures
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate a configuration file
    Validate {
        /// File to validate (default: the resolved config)
        path: Option<PathBuf>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Classify(_) => "classify",
            Commands::GenVar(_) => "gen-var",
            Commands::TrainSpeed(_) => "train-speed",
            Commands::Check(_) => "check",
            Commands::Config(_) => "config",
            Commands::Schema => "schema",
            Commands::Completions { .. } => "completions",
            Commands::Version => "version",
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Clean,
                _ => ExitCode::ArgsError,
            };
            let _ = err.print();
            std::process::exit(code.as_i32());
        }
    };

    let cli_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let run_id = RunId::new();
    let command = cli.command.name();
    let ctx = LogContext::new(run_id.to_string()).with_command(command);
    let span = tracing::info_span!("run", run_id = %run_id, command = command);
    let _guard = span.enter();

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_STARTED,
        Stage::Init,
        "run started",
        version = env!("CARGO_PKG_VERSION")
    );

    let exit_code = match &cli.command {
        Commands::Classify(args) => run_classify(&cli.global, args, &run_id, &ctx),
        Commands::GenVar(args) => run_gen_var(&cli.global, args, &ctx),
        Commands::TrainSpeed(args) => run_train_speed(&cli.global, args, &ctx),
        Commands::Check(args) => run_check(&cli.global, args, &ctx),
        Commands::Config(args) => run_config(&cli.global, args, &ctx),
        Commands::Schema => run_schema(&cli.global, &ctx),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "bp-core", &mut std::io::stdout());
            ExitCode::Clean
        }
        Commands::Version => {
            print_version(&cli.global);
            ExitCode::Clean
        }
    };

    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "run finished",
        exit_code = exit_code.as_i32()
    );
    drop(_guard);
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Shared helpers
// ============================================================================

fn config_error(err: ValidationError) -> bp_common::Error {
    bp_common::Error::Config(err.to_string())
}

/// Resolve the configuration for a command, logging where it came from.
fn resolve_config(
    global: &GlobalOpts,
    ctx: &LogContext,
) -> Result<ResolvedConfig, bp_common::Error> {
    let resolved = load_config(global.config.as_deref()).map_err(config_error)?;
    if resolved.source == ConfigSource::BuiltinDefault {
        log_event!(
            ctx,
            DEBUG,
            event_names::CONFIG_DEFAULT_USED,
            Stage::Init,
            "no config file found; using built-in defaults"
        );
    } else {
        let source = resolved.source.to_string();
        let path = resolved
            .path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        log_event!(
            ctx,
            INFO,
            event_names::CONFIG_LOADED,
            Stage::Init,
            "configuration loaded",
            source = source.as_str(),
            path = path.as_str()
        );
    }
    Ok(resolved)
}

/// Report an error on stderr and map it to an exit code. Nothing is
/// written to stdout.
fn output_error(global: &GlobalOpts, ctx: &LogContext, err: &bp_common::Error) -> ExitCode {
    let code = ExitCode::from_error(err);
    if code.is_internal_error() {
        log_event!(
            ctx,
            ERROR,
            event_names::INTERNAL_ERROR,
            Stage::Report,
            err.to_string(),
            code_name = code.code_name()
        );
    }
    if global.format.is_machine() {
        let payload = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": ctx.run_id,
            "command": ctx.command,
            "exit_code": code.as_i32(),
            "code_name": code.code_name(),
            "error": err.to_json(),
        });
        eprintln!("{}", payload);
    } else {
        eprintln!("{}", err.human());
    }
    code
}

fn write_stdout(render: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    render(&mut lock)?;
    lock.flush()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), bp_common::Error> {
    let text = serde_json::to_string_pretty(value)?;
    write_stdout(|out| writeln!(out, "{}", text))?;
    Ok(())
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_classify(
    global: &GlobalOpts,
    args: &ClassifyArgs,
    run_id: &RunId,
    ctx: &LogContext,
) -> ExitCode {
    let result = (|| -> Result<BatchReport, bp_common::Error> {
        let resolved = resolve_config(global, ctx)?;
        let inputs = ClassifyInputs {
            speed_data: args.speed_data.clone(),
            speed_likelihoods: args.speed_likelihoods.clone(),
            variation_data: args.variation_data.clone(),
            variation_likelihoods: args.variation_likelihoods.clone(),
        };
        let options = ClassifyOptions {
            objects: args.objects.unwrap_or(resolved.config.batch.objects),
            explain: args.explain,
        };
        classify_batch(&inputs, options, &resolved, run_id, ctx)
    })();

    let report = match result {
        Ok(report) => report,
        Err(err) => return output_error(global, ctx, &err),
    };

    // Rendering happens only after every object has been classified.
    match write_stdout(|out| {
        let mut out = out;
        report.render(global.format, args.explain, &mut out)
    }) {
        Ok(()) => ExitCode::Clean,
        Err(err) => output_error(global, ctx, &bp_common::Error::Io(err)),
    }
}

fn run_gen_var(global: &GlobalOpts, args: &GenVarArgs, ctx: &LogContext) -> ExitCode {
    let result = resolve_config(global, ctx).and_then(|resolved| {
        generate_variation(
            &args.training_data,
            &args.test_data,
            &args.variation_data_out,
            &args.variation_likelihoods_out,
            &resolved.config,
            ctx,
        )
    });
    match result {
        Ok(summary) => {
            let printed = match global.format {
                OutputFormat::Json | OutputFormat::Jsonl => print_json(&summary),
                OutputFormat::Summary => write_stdout(|out| {
                    writeln!(
                        out,
                        "[{}] gen-var: {} training tracks, {} test tracks",
                        ctx.run_id, summary.likelihoods.tracks, summary.test_tracks
                    )
                })
                .map_err(bp_common::Error::from),
                // Text mode stays silent so shell pipelines see only the files.
                OutputFormat::Text => Ok(()),
            };
            match printed {
                Ok(()) => ExitCode::Clean,
                Err(err) => output_error(global, ctx, &err),
            }
        }
        Err(err) => output_error(global, ctx, &err),
    }
}

fn run_train_speed(global: &GlobalOpts, args: &TrainSpeedArgs, ctx: &LogContext) -> ExitCode {
    let result = resolve_config(global, ctx).and_then(|resolved| {
        let width = args.width.unwrap_or(resolved.config.speed.table_width);
        if width == 0 {
            return Err(bp_common::Error::Usage("--width must be at least 1".to_string()));
        }
        train_speed(&args.training_data, &args.out, width, &resolved.config, ctx)
    });
    match result {
        Ok(summary) => {
            let printed = match global.format {
                OutputFormat::Json | OutputFormat::Jsonl => print_json(&summary),
                OutputFormat::Summary => write_stdout(|out| {
                    writeln!(
                        out,
                        "[{}] train-speed: {} tracks, width {}",
                        ctx.run_id, summary.tracks, summary.width
                    )
                })
                .map_err(bp_common::Error::from),
                OutputFormat::Text => Ok(()),
            };
            match printed {
                Ok(()) => ExitCode::Clean,
                Err(err) => output_error(global, ctx, &err),
            }
        }
        Err(err) => output_error(global, ctx, &err),
    }
}

fn run_check(global: &GlobalOpts, args: &CheckArgs, ctx: &LogContext) -> ExitCode {
    let result = resolve_config(global, ctx).and_then(|resolved| {
        check_tables(
            &args.speed_likelihoods,
            &args.variation_likelihoods,
            &resolved.config,
            ctx,
        )
    });
    let report = match result {
        Ok(report) => report,
        Err(err) => return output_error(global, ctx, &err),
    };

    let status = if report.is_clean() { "ok" } else { "warnings" };
    let printed = match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": ctx.run_id,
            "status": status,
            "strict": args.strict,
            "tables": report.tables,
            "warnings": report.warnings,
        })),
        OutputFormat::Summary => write_stdout(|out| {
            writeln!(
                out,
                "[{}] check: {} tables, {} warnings",
                ctx.run_id,
                report.tables.len(),
                report.warnings.len()
            )
        })
        .map_err(bp_common::Error::from),
        OutputFormat::Text => write_stdout(|out| {
            let mut out = out;
            report.write_text(&mut out)
        })
        .map_err(bp_common::Error::from),
    };
    if let Err(err) = printed {
        return output_error(global, ctx, &err);
    }

    if args.strict && !report.is_clean() {
        ExitCode::DataError
    } else {
        ExitCode::Clean
    }
}

fn run_config(global: &GlobalOpts, args: &ConfigArgs, ctx: &LogContext) -> ExitCode {
    match &args.command {
        ConfigCommands::Show => run_config_show(global, ctx),
        ConfigCommands::Validate { path } => run_config_validate(global, path.as_deref(), ctx),
    }
}

/// Display the effective configuration (built-in defaults if no file applies).
fn run_config_show(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let resolved = match resolve_config(global, ctx) {
        Ok(r) => r,
        Err(err) => return output_error(global, ctx, &err),
    };
    let snapshot = ConfigSnapshot::new(&resolved);

    let printed = match global.format {
        OutputFormat::Summary => write_stdout(|out| {
            writeln!(
                out,
                "[{}] config: source={} hash={}",
                ctx.run_id,
                snapshot.source,
                snapshot.config_hash.get(..12).unwrap_or(&snapshot.config_hash)
            )
        })
        .map_err(bp_common::Error::from),
        OutputFormat::Json | OutputFormat::Jsonl => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": ctx.run_id,
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "snapshot": snapshot,
            "config": resolved.config,
        })),
        OutputFormat::Text => {
            let source = match &resolved.path {
                Some(p) => format!("{} ({})", resolved.source, p.display()),
                None => resolved.source.to_string(),
            };
            serde_json::to_string_pretty(&resolved.config)
                .map_err(bp_common::Error::from)
                .and_then(|body| {
                    write_stdout(|out| {
                        writeln!(out, "# source: {}", source)?;
                        writeln!(out, "# hash: {}", snapshot.config_hash)?;
                        writeln!(out, "{}", body)
                    })
                    .map_err(bp_common::Error::from)
                })
        }
    };
    match printed {
        Ok(()) => ExitCode::Clean,
        Err(err) => output_error(global, ctx, &err),
    }
}

/// Validate a configuration file, or the resolved one when no path is given.
fn run_config_validate(global: &GlobalOpts, path: Option<&Path>, ctx: &LogContext) -> ExitCode {
    let loaded = match path {
        Some(p) => load_from(p, ConfigSource::CliArgument).map_err(config_error),
        None => resolve_config(global, ctx),
    };
    let resolved = match loaded {
        Ok(r) => r,
        Err(err) => return output_error(global, ctx, &err),
    };

    let location = resolved
        .path
        .as_deref()
        .map(|p| p.display().to_string());
    let printed = match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => print_json(&serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "run_id": ctx.run_id,
            "status": "valid",
            "source": resolved.source.to_string(),
            "path": location,
        })),
        OutputFormat::Summary => {
            write_stdout(|out| writeln!(out, "[{}] config validate: OK", ctx.run_id))
                .map_err(bp_common::Error::from)
        }
        OutputFormat::Text => write_stdout(|out| match &location {
            Some(p) => writeln!(out, "valid: {}", p),
            None => writeln!(out, "valid: built-in defaults"),
        })
        .map_err(bp_common::Error::from),
    };
    match printed {
        Ok(()) => ExitCode::Clean,
        Err(err) => output_error(global, ctx, &err),
    }
}

fn run_schema(global: &GlobalOpts, ctx: &LogContext) -> ExitCode {
    let schema = schemars::schema_for!(BatchReport);
    match print_json(&schema) {
        Ok(()) => ExitCode::Clean,
        Err(err) => output_error(global, ctx, &err),
    }
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "bp_core_version": env!("CARGO_PKG_VERSION"),
        "config_schema_version": bp_config::CONFIG_SCHEMA_VERSION,
    });

    match global.format {
        OutputFormat::Json | OutputFormat::Jsonl => {
            println!("{}", version_info);
        }
        _ => {
            println!("bp-core {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}

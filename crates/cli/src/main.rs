// ownerdata CLI - match owner leads against the bottoms-up reference

mod exit_codes;
mod progress;
mod run;
mod status;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use ownerdata_config::Settings;
use ownerdata_engine::EngineError;

use exit_codes::{engine_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};
use progress::ProgressMode;

#[derive(Parser)]
#[command(name = "ownerdata")]
#[command(about = "Match owner leads against the bottoms-up database and enrich them")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalArgs {
    /// Settings file (default: <config dir>/ownerdata/config.toml)
    #[arg(long, global = true, env = "OWNERDATA_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding the single .db reference file
    #[arg(long, global = true)]
    reference_dir: Option<PathBuf>,

    /// Folder scanned for .csv / .xlsx lead files
    #[arg(long, global = true)]
    input_dir: Option<PathBuf>,

    /// Folder receiving output_<name> files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every input file and write enriched results
    #[command(after_help = "\
Examples:
  ownerdata run
  ownerdata run --progress json 2> progress.ndjson
  ownerdata run --json > result.json
  ownerdata run --input-dir leads/ --output-dir out/ --summary out/summary.json")]
    Run {
        /// Print the run result as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Also write the run result as JSON to this file
        #[arg(long, value_name = "PATH")]
        summary: Option<PathBuf>,

        /// Progress output on stderr
        #[arg(long, value_enum, default_value = "human")]
        progress: ProgressMode,
    },

    /// Show which reference and input files were found and whether a run can start
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or create the settings file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective settings as TOML
    Show,

    /// Write the default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  ownerdata-engine ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.quiet);

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: ownerdata <command> [options]");
            eprintln!("       ownerdata --help for more information");
            Ok(())
        }
        Some(Commands::Run { json, summary, progress }) => {
            load_settings(&cli.global).and_then(|s| run::cmd_run(&s, json, summary, progress))
        }
        Some(Commands::Status { json }) => {
            load_settings(&cli.global).and_then(|s| status::cmd_status(&s, json))
        }
        Some(Commands::Config(ConfigCommands::Show)) => cmd_config_show(&cli.global),
        Some(Commands::Config(ConfigCommands::Init { force })) => cmd_config_init(&cli.global, force),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Create error from engine error with proper exit code.
    pub fn engine(err: EngineError) -> Self {
        let code = engine_exit_code(&err);
        let hint = match &err {
            EngineError::NotFound { dir } => Some(format!(
                "add the bottoms-up database file to {}",
                dir.display()
            )),
            EngineError::AmbiguousSource { dir, .. } => {
                Some(format!("keep exactly one .db file in {}", dir.display()))
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Engine error whose message was already logged by the run.
    pub fn reported(err: &EngineError) -> Self {
        Self { code: engine_exit_code(err), message: String::new(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Settings file (or defaults), then folder flags, resolved against the
/// current directory.
fn load_settings(args: &GlobalArgs) -> Result<Settings, CliError> {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path)
            .map_err(|e| CliError::usage(format!("{}: {}", path.display(), e)))?,
        None => Settings::load(),
    };

    if let Some(dir) = &args.reference_dir {
        settings.reference_dir = dir.clone();
    }
    if let Some(dir) = &args.input_dir {
        settings.input_dir = dir.clone();
    }
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }

    let cwd = std::env::current_dir().map_err(|e| CliError::io(e.to_string()))?;
    Ok(settings.resolve(&cwd))
}

// ============================================================================
// config
// ============================================================================

fn cmd_config_show(args: &GlobalArgs) -> Result<(), CliError> {
    let settings = load_settings(args)?;
    let path = args
        .config
        .clone()
        .unwrap_or_else(Settings::config_path);
    let toml = settings.to_toml().map_err(CliError::io)?;
    println!("# {}", path.display());
    print!("{}", toml);
    Ok(())
}

fn cmd_config_init(args: &GlobalArgs, force: bool) -> Result<(), CliError> {
    let path = args
        .config
        .clone()
        .unwrap_or_else(Settings::config_path);
    if path.exists() && !force {
        return Err(CliError::usage(format!("{} already exists", path.display()))
            .with_hint("pass --force to overwrite it"));
    }
    Settings::default().save_to(&path).map_err(CliError::io)?;
    log::info!("Wrote default settings to {}", path.display());
    Ok(())
}

// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use glossfill::app_config::{self, Config, DatabaseBackend, DatabaseConfig};
use glossfill::app_controller::{Controller, ExtractOptions, RunOutcome};
use glossfill::errors::AppError;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for DatabaseBackend to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliDatabaseBackend {
    Mysql,
    Sqlite,
}

impl From<CliDatabaseBackend> for DatabaseBackend {
    fn from(cli_backend: CliDatabaseBackend) -> Self {
        match cli_backend {
            CliDatabaseBackend::Mysql => DatabaseBackend::MySql,
            CliDatabaseBackend::Sqlite => DatabaseBackend::Sqlite,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import JSON word lists into the database
    Import {
        /// Directory holding `<language>-<category>[_<n>].json` files
        #[arg(short, long)]
        words_dir: Option<PathBuf>,
    },

    /// Derive short glosses from stored meanings
    Extract {
        /// Words fetched per round trip
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// Use punctuation-based extraction only
        #[arg(long)]
        no_segmentation: bool,
    },

    /// Translate headwords that still lack a short gloss
    Translate {
        /// Words fetched per round trip
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// Show gloss coverage statistics
    Stats,

    /// Preview stored glosses next to a dry run of the extractor
    Check {
        /// Number of words to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Generate shell completions for glossfill
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Database connection overrides
#[derive(Args, Debug, Default)]
struct DatabaseArgs {
    /// Database backend
    #[arg(long, value_enum, global = true)]
    db_backend: Option<CliDatabaseBackend>,

    /// MySQL host
    #[arg(long, global = true)]
    db_host: Option<String>,

    /// MySQL port
    #[arg(long, global = true)]
    db_port: Option<u16>,

    /// MySQL database name
    #[arg(long, global = true)]
    db_name: Option<String>,

    /// MySQL user
    #[arg(long, global = true)]
    db_user: Option<String>,

    /// MySQL password
    #[arg(long, global = true, env = "GLOSSFILL_DB_PASSWORD", hide_env_values = true)]
    db_password: Option<String>,

    /// SQLite database file
    #[arg(long, global = true)]
    sqlite_path: Option<PathBuf>,
}

impl DatabaseArgs {
    fn apply(&self, config: &mut DatabaseConfig) {
        if let Some(backend) = &self.db_backend {
            config.backend = backend.clone().into();
        }
        if let Some(host) = &self.db_host {
            config.host = host.clone();
        }
        if let Some(port) = self.db_port {
            config.port = port;
        }
        if let Some(name) = &self.db_name {
            config.database = name.clone();
        }
        if let Some(user) = &self.db_user {
            config.username = user.clone();
        }
        if let Some(password) = &self.db_password {
            config.password = password.clone();
        }
        if let Some(path) = &self.sqlite_path {
            config.sqlite_path = Some(path.clone());
        }
    }
}

/// glossfill - vocabulary import and short gloss backfill
///
/// Imports JSON word lists into the vocabulary database and fills the
/// short gloss of every word, either from its stored meaning or through
/// a translation service.
#[derive(Parser, Debug)]
#[command(name = "glossfill")]
#[command(version)]
#[command(about = "Vocabulary import and short gloss backfill")]
#[command(long_about = "glossfill imports vocabulary word lists and fills short glosses.

EXAMPLES:
    glossfill import                            # Import ./words/*.json
    glossfill import -w /data/words             # Import from another directory
    glossfill extract                           # Derive glosses from meanings
    glossfill extract --no-segmentation         # Punctuation-based extraction only
    glossfill translate -b 20                   # Translate headwords, 20 per batch
    glossfill stats                             # Coverage statistics
    glossfill check -n 5                        # Dry run on 5 stored words
    glossfill --db-backend sqlite stats         # Use the local SQLite database
    glossfill completions bash > glossfill.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically. The database password may be supplied with
    the GLOSSFILL_DB_PASSWORD environment variable.

EXIT CODES:
    0   success
    1   failure
    130 interrupted (Ctrl-C)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    #[command(flatten)]
    database: DatabaseArgs,
}

/// Optional plain-text copy of every log record
static LOG_FILE: OnceCell<Mutex<File>> = OnceCell::new();

// @struct: Custom logger implementation
//
// Filtering follows `log::max_level()` so the level can change once the
// config is loaded.
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @initializes: Append-mode log file
    fn attach_file(path: &Path) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        let _ = LOG_FILE.set(Mutex::new(file));
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // Dependencies (sqlx statement logs in particular) only surface warnings
        metadata.level() <= log::max_level()
            && (metadata.target().starts_with("glossfill") || metadata.level() <= Level::Warn)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let now = chrono::Local::now();
        let _ = writeln!(
            std::io::stderr(),
            "{}{} {} {}\x1B[0m",
            Self::get_color_for_level(record.level()),
            now.format("%H:%M:%S.%3f"),
            Self::get_emoji_for_level(record.level()),
            record.args()
        );

        if let Some(file) = LOG_FILE.get() {
            if let Ok(mut file) = file.lock() {
                let _ = writeln!(
                    file,
                    "{} - {} - {}",
                    now.format("%Y-%m-%d %H:%M:%S%.3f"),
                    record.level(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
        if let Some(file) = LOG_FILE.get() {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "glossfill", &mut std::io::stdout());
        return;
    }

    // Start at the CLI level (or info); the config may lower or raise it
    let initial_level = cli
        .log_level
        .clone()
        .map(|level| app_config::LogLevel::from(level).to_level_filter())
        .unwrap_or(LevelFilter::Info);
    if let Err(e) = CustomLogger::init(initial_level) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let exit_code = match run(cli).await {
        Ok(RunOutcome::Completed) => 0,
        Ok(RunOutcome::Interrupted) => {
            warn!("{}", AppError::Interrupted);
            RunOutcome::Interrupted.exit_code()
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    };

    log::logger().flush();
    std::process::exit(exit_code);
}

async fn run(cli: CommandLineOptions) -> Result<RunOutcome, AppError> {
    let config = load_config(&cli)?;
    let controller = Controller::with_config(config);

    let result = match cli.command {
        Commands::Import { words_dir } => controller.run_import(words_dir).await,
        Commands::Extract {
            batch_size,
            no_segmentation,
        } => {
            controller
                .run_extract(ExtractOptions {
                    batch_size,
                    no_segmentation,
                })
                .await
        }
        Commands::Translate { batch_size } => controller.run_translate(batch_size).await,
        Commands::Stats => controller.run_stats().await.map(|()| RunOutcome::Completed),
        Commands::Check { limit } => controller.run_check(limit).await.map(|()| RunOutcome::Completed),
        Commands::Completions { .. } => Ok(RunOutcome::Completed),
    };

    result.map_err(AppError::from)
}

/// Load the config file, apply CLI overrides and validate
fn load_config(cli: &CommandLineOptions) -> Result<Config, AppError> {
    if !Path::new(&cli.config_path).exists() {
        warn!("Config file not found at '{}', creating default config.", cli.config_path);
    }

    let mut config =
        Config::load_or_create(&cli.config_path).map_err(|e| AppError::Config(format!("{:#}", e)))?;

    cli.database.apply(&mut config.database);
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }

    config
        .validate()
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;

    log::set_max_level(config.log_level.to_level_filter());
    if let Some(path) = &config.log_file {
        CustomLogger::attach_file(path).map_err(|e| AppError::File(format!("{:#}", e)))?;
    }

    Ok(config)
}

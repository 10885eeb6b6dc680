// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use llmtrans::app_config::{Config, LlmProvider, LogLevel};
use llmtrans::app_controller::Controller;
use llmtrans::table_io;
use llmtrans::translation::OutputFormat;

/// CLI wrapper for LlmProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProvider {
    OpenAI,
    Anthropic,
}

impl From<CliProvider> for LlmProvider {
    fn from(cli_provider: CliProvider) -> Self {
        match cli_provider {
            CliProvider::OpenAI => LlmProvider::OpenAI,
            CliProvider::Anthropic => LlmProvider::Anthropic,
        }
    }
}

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI wrapper for OutputFormat to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Text,
    Table,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Text => OutputFormat::Text,
            CliOutputFormat::Table => OutputFormat::Table,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text from a file or stdin
    Translate {
        /// Input text file, stdin when omitted or "-"
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: CliOutputFormat,
    },

    /// Score translations in a two-column table (source, target)
    Qa {
        /// TSV or CSV table, stdin when omitted or "-"
        #[arg(value_name = "TABLE")]
        table: Option<PathBuf>,
    },

    /// Compare two engines in a three-column table (source, target1, target2)
    Compare {
        /// TSV or CSV table, stdin when omitted or "-"
        #[arg(value_name = "TABLE")]
        table: Option<PathBuf>,
    },

    /// Generate shell completions for llmtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// llmtrans - translation and translation review with LLMs
#[derive(Parser, Debug)]
#[command(name = "llmtrans")]
#[command(version)]
#[command(about = "Translate text and review translations with LLMs")]
#[command(long_about = "llmtrans translates text with a chat-completion model and grades existing translations.

EXAMPLES:
    llmtrans translate notes.txt                     # Sentence-aligned TSV, English to Japanese
    llmtrans translate -f text -s ja -t en memo.txt  # Plain translation, Japanese to English
    llmtrans qa pairs.tsv -o report.tsv              # Score source/target pairs
    llmtrans compare engines.csv                     # Compare two engines row by row
    llmtrans completions bash > llmtrans.bash        # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. API keys are read from OPENAI_API_KEY or
    ANTHROPIC_API_KEY unless llm.api_key_env names another variable.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// LLM provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliProvider>,

    /// Model name for translation and evaluation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Source language, as a name or ISO code
    #[arg(short, long, global = true)]
    source_language: Option<String>,

    /// Target language, as a name or ISO code
    #[arg(short, long, global = true)]
    target_language: Option<String>,

    /// Write output here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// Custom logger writing colored lines to stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn get_symbol_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "✗",
            Level::Warn => "!",
            Level::Info => " ",
            Level::Debug => "·",
            Level::Trace => "»",
        }
    }

    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_symbol_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Max level is lowered or raised once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "llmtrans", &mut io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        log::set_max_level(LogLevel::from(level.clone()).into());
    }

    let config = load_config(&cli)?;
    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.into());
    }

    let result = run(cli, config).await;
    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config)?;

    if let Some(provider) = &cli.provider {
        config.llm.provider = provider.clone().into();
    }
    if let Some(model) = &cli.model {
        config.llm.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        config.llm.temperature = temperature;
    }
    if let Some(source_language) = &cli.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &cli.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run(cli: CommandLineOptions, config: Config) -> Result<()> {
    let mut controller = Controller::with_config(config)?;
    let mut out = open_output(cli.output.as_deref())?;

    match cli.command {
        Commands::Translate { input, format } => {
            let text = read_input(input.as_deref())?;
            controller.run_translate(&text, format.into(), &mut out).await?;
        }
        Commands::Qa { table } => {
            let rows = table_io::qa_rows(table_io::read_rows(table.as_deref())?)?;
            controller.run_qa(rows, &mut out).await?;
        }
        Commands::Compare { table } => {
            let rows = table_io::comparison_rows(table_io::read_rows(table.as_deref())?)?;
            controller.run_compare(rows, &mut out).await?;
        }
        Commands::Completions { .. } => return Err(anyhow!("Completions are handled before loading the config")),
    }

    out.flush()?;
    if let Some(path) = &cli.output {
        info!("Success: {:?}", path);
    }
    eprintln!("{}", controller.costs().summary());
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("Failed to read input file: {:?}", path))
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read input from stdin")?;
            Ok(text)
        }
    }
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

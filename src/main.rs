// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use transcript_translator::app_config::{self, Config};
use transcript_translator::providers::openai::OpenAICaller;
use transcript_translator::{AppError, SharedCaller, Transcript, TranslationOutcome, Translator};

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate the Arabic lines of a transcript to English
    Translate(TranslateArgs),

    /// Check that the configured OpenAI endpoint accepts the API key
    Check(CheckArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Transcript JSON file: an array of {speaker, time, sentence}
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Where to write the translated transcript (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Maximum prompt size in bytes
    #[arg(short, long)]
    budget: Option<usize>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Print the prompts that would be sent and exit
    #[arg(long)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,
}

/// Translate the Arabic lines of speaker-attributed transcripts with an LLM
#[derive(Parser, Debug)]
#[command(name = "transcript-translator")]
#[command(version)]
#[command(about = "LLM-backed translation of Arabic transcript lines")]
#[command(long_about = "Reads a transcript (JSON array of {speaker, time, sentence}), sends every
line containing Arabic text to OpenAI in size-bounded batches and writes the
transcript back with those lines translated to English.

EXAMPLES:
    transcript-translator translate call.json                 # Print translated transcript
    transcript-translator translate call.json -o out.json     # Write to a file
    transcript-translator translate call.json --dry-run       # Show prompts only
    transcript-translator check                               # Verify API key and endpoint
    transcript-translator completions bash > tt.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created. The API key is read from OPENAI_API_KEY (a .env
    file in the working directory is loaded first) when the config leaves it empty.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
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
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(std::io::stderr(), "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Accept every level here, the effective one is set with set_max_level
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "transcript-translator", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Check(args) => run_check(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            exit_code_for(&e)
        }
    }
}

// Input problems and startup problems get their own codes so scripts can tell them apart
fn exit_code_for(error: &AppError) -> ExitCode {
    match error {
        AppError::Transcript(_) => ExitCode::from(2),
        AppError::Config(_) => ExitCode::from(3),
        AppError::Translation(e) if e.is_initialization() => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}

async fn run_translate(options: TranslateArgs) -> Result<(), AppError> {
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    load_dotenv()?;
    let config = load_config(&options.config_path, |config| {
        if let Some(budget) = options.budget {
            config.translation.prompt_budget = budget;
        }
        if let Some(model) = &options.model {
            config.translation.openai.model = model.clone();
        }
        if let Some(level) = &options.log_level {
            config.log_level = level.clone().into();
        }
    })?;
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let file = File::open(&options.input_path)
        .map_err(|e| AppError::File(format!("{}: {}", options.input_path.display(), e)))?;
    let mut transcript = Transcript::from_reader(BufReader::new(file))?;
    transcript.validate()?;
    debug!("Loaded {} entries from {}", transcript.len(), options.input_path.display());

    if options.dry_run {
        let batcher = transcript_translator::translation::PromptBatcher::new(config.translation.prompt_budget);
        let batch = batcher.build_prompts(&transcript);
        info!("{} prompt(s), {} line(s) to translate", batch.len(), batch.line_count());
        for (i, prompt) in batch.prompts.iter().enumerate() {
            println!("--- prompt {}/{} ({} bytes) ---\n{}", i + 1, batch.len(), prompt.len(), prompt);
        }
        return Ok(());
    }

    // Built once here and shared by every translator created from it
    let shared = SharedCaller::new();
    let caller = shared.get_or_init(|| OpenAICaller::from_config(&config.translation.openai))?;
    info!("Using OpenAI model {}", caller.model());

    let translator = Translator::new(caller, config.translation.prompt_budget);
    match translator.translate(&mut transcript).await? {
        TranslationOutcome::NothingToTranslate => info!("No Arabic text found, transcript left unchanged"),
        TranslationOutcome::Translated(report) => {
            info!("Translated {} line(s) in {} chunk(s)", report.applied, report.chunks)
        }
    }

    // The input was already accepted, so a failure here is not an input error
    let json = transcript.to_json_pretty()
        .map_err(|e| AppError::File(format!("Failed to serialize transcript: {}", e)))?;
    match &options.output {
        Some(path) => {
            std::fs::write(path, json)?;
            info!("Success: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn run_check(options: CheckArgs) -> Result<(), AppError> {
    load_dotenv()?;
    let config = load_config(&options.config_path, |_| {})?;
    log::set_max_level(config.log_level.to_level_filter());

    let caller = OpenAICaller::from_config(&config.translation.openai)?;
    caller.check_connection().await
        .map_err(|e| AppError::Config(format!("OpenAI connection check failed: {}", e)))?;

    info!("OpenAI endpoint {} is reachable, model {}", config.translation.openai.endpoint, caller.model());
    Ok(())
}

fn load_dotenv() -> Result<(), AppError> {
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => warn!("No .env file found, loading environment variables from system."),
        Err(e) => return Err(AppError::Config(format!("Failed to load .env file: {}", e))),
    }
    Ok(())
}

fn load_config<F>(config_path: &str, overrides: F) -> Result<Config, AppError>
where
    F: FnOnce(&mut Config),
{
    let mut config = Config::load_or_create(config_path)
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;

    config.apply_env(|key| std::env::var(key).ok());
    overrides(&mut config);

    config.validate()
        .map_err(|e| AppError::Config(format!("Configuration validation failed: {:#}", e)))?;

    Ok(config)
}

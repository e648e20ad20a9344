//! logsan - sanitize PII and secrets out of log files.

use clap::{Args, Parser, Subcommand};
use logsan_cli::config::{self, ConfigOverrides};
use logsan_cli::output::{self, LoggedProgress, OutputFormat};
use logsan_cli::{init_logging, CliError, ExitCode, LogConfig, LogFormat, LogLevel, Result};
use logsan_redact::{PiiCategory, SanitizationEngine};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "logsan")]
#[command(author, version, about = "Replace PII and secrets in log files with stable tokens")]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config file (TOML, or JSON by extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Comma-separated categories to detect (default: all)
    #[arg(long, global = true, value_delimiter = ',')]
    targets: Option<Vec<PiiCategory>>,

    /// Replacement text when hashing is disabled
    #[arg(long, global = true)]
    placeholder: Option<String>,

    /// Replace category matches with the placeholder instead of tokens
    #[arg(long, global = true)]
    no_hash: bool,

    /// Salt for token hashing (default: random per run)
    #[arg(long, global = true, env = "LOGSAN_SALT", hide_env_values = true)]
    salt: Option<String>,

    /// Treat JSON-looking lines as plain text
    #[arg(long, global = true)]
    no_json: bool,

    /// Overwrite existing output files
    #[arg(long, global = true)]
    overwrite: bool,

    /// Comma-separated file extensions processed in directory mode
    #[arg(long = "ext", global = true, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Result output format
    #[arg(long, short = 'f', global = true, default_value = "human")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

impl GlobalOpts {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            targets: self.targets.clone(),
            placeholder: self.placeholder.clone(),
            salt: self.salt.clone(),
            extensions: self.extensions.clone(),
            no_hash: self.no_hash,
            no_json: self.no_json,
            overwrite: self.overwrite,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Sanitize a single file
    File {
        /// Log file to read
        input: PathBuf,
        /// Destination for the sanitized copy
        output: PathBuf,
    },

    /// Sanitize every eligible file in a directory
    Dir {
        /// Directory to scan (top level only)
        input_dir: PathBuf,
        /// Directory receiving sanitized copies
        output_dir: PathBuf,
    },

    /// Sanitize one line of text and print it
    Line {
        /// Text to sanitize
        text: String,
    },

    /// List detection categories and their token codes
    Categories,
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(
        LogLevel::from_flags(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => report_error(cli.global.format, &e),
    };
    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let global = &cli.global;
    match &cli.command {
        Commands::Categories => {
            print_out(&output::render_categories(global.format)?)?;
            Ok(ExitCode::Clean)
        }
        Commands::Line { text } => {
            let engine = build_engine(global)?;
            print_out(&engine.sanitize_line(text))?;
            Ok(ExitCode::Clean)
        }
        Commands::File { input, output } => run_file(global, input, output),
        Commands::Dir {
            input_dir,
            output_dir,
        } => run_dir(global, input_dir, output_dir),
    }
}

fn build_engine(global: &GlobalOpts) -> Result<SanitizationEngine> {
    let resolved = config::load(global.config.as_deref(), &global.overrides())?;
    tracing::info!(
        source = %resolved.source,
        targets = resolved.config.targets.len(),
        "configuration loaded"
    );
    Ok(SanitizationEngine::new(resolved.config)?)
}

fn run_file(global: &GlobalOpts, input: &Path, output: &Path) -> Result<ExitCode> {
    let engine = build_engine(global)?;
    let progress = LoggedProgress::new(input.display().to_string());
    let stats = engine.process_file_with_progress(input, output, &progress)?;
    print_out(&output::render_file(global.format, input, output, stats)?)?;
    Ok(ExitCode::Clean)
}

fn run_dir(global: &GlobalOpts, input_dir: &Path, output_dir: &Path) -> Result<ExitCode> {
    let engine = build_engine(global)?;
    let progress = LoggedProgress::new(input_dir.display().to_string());
    let summary = engine.process_directory_with_progress(input_dir, output_dir, &progress)?;
    print_out(&output::render_batch(global.format, &summary)?)?;
    Ok(output::batch_exit_code(&summary))
}

fn print_out(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    stdout.flush()?;
    Ok(())
}

fn report_error(format: OutputFormat, err: &CliError) -> ExitCode {
    let code = err.exit_code();
    let message = err.to_string();
    tracing::error!(code = code.code_name(), "{}", message);
    match output::render_error(format, code, &message) {
        Ok(Some(doc)) => println!("{}", doc),
        _ => eprintln!("logsan: error: {}", message),
    }
    code
}

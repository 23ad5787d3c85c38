//! # docextract: Single-document field extraction
//!
//! Entry point for the `docextract` command-line interface. Results are printed
//! to stdout; logs and errors go to stderr.

mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use crate::config::{get_config, AppConfig};
use docextract::constants::FUND_TERMS_TASK;
use docextract::output::parse_extraction_line;
use docextract::prompts::core::render_prompt;
use docextract::providers::factory::create_backend;
use docextract::{DocumentLoader, ExtractError, ExtractionPipeline};
use docextract_pdf::PdfLoader;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Path to a YAML config file (defaults to ./docextract.yml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract fields from a PDF with a completion backend
    Extract(ExtractArgs),
    /// Print the prompt that would be sent for a PDF, without calling a backend
    Render(RenderArgs),
    /// List the configured tasks and providers
    Tasks,
}

#[derive(Args, Debug)]
struct TaskArgs {
    /// The PDF file to read
    path: PathBuf,
    /// The extraction task to run
    #[arg(short, long, default_value = FUND_TERMS_TASK)]
    task: String,
    /// Override the task's truncation limit, in characters
    #[arg(long)]
    max_chars: Option<usize>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    #[command(flatten)]
    task: TaskArgs,
    /// Use this provider instead of the task's configured one
    #[arg(short, long)]
    provider: Option<String>,
    /// Override the provider's model name
    #[arg(short, long)]
    model: Option<String>,
    /// Also write the full extracted text to this file
    #[arg(long)]
    dump_text: Option<PathBuf>,
    /// Fail unless the completion matches a known output format
    #[arg(long)]
    strict: bool,
    /// Print the parsed fields as JSON (requires --strict)
    #[arg(long, requires = "strict")]
    json: bool,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    task: TaskArgs,
}

// --- Main Application Entry ---

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = get_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract(args) => handle_extract(&config, args).await,
        Commands::Render(args) => handle_render(&config, args),
        Commands::Tasks => {
            handle_tasks(&config);
            Ok(())
        }
    }
}

fn report_error(err: &anyhow::Error) {
    eprintln!("Error: {err:#}");
    if let Some(hint) = err.downcast_ref::<ExtractError>().and_then(ExtractError::hint) {
        eprintln!("Hint: {hint}");
    }
}

// --- Command Handlers ---

async fn handle_extract(config: &AppConfig, args: ExtractArgs) -> Result<()> {
    let task = config.task(&args.task.task)?;
    let provider_name = args.provider.as_deref().unwrap_or(&task.provider);
    let mut provider = config.provider(provider_name)?.clone();
    if let Some(model) = args.model {
        provider.model_name = model;
    }

    info!(
        "Running task '{}' with provider '{}' (model '{}')",
        args.task.task, provider_name, provider.model_name
    );

    let pipeline = ExtractionPipeline::builder()
        .loader(Box::new(PdfLoader::new()))
        .backend(create_backend(&provider)?)
        .build()?;
    let options = config.extraction_options(task, args.task.max_chars);

    let completion = match &args.dump_text {
        None => pipeline.run(&args.task.path, &options).await?,
        Some(dump_path) => {
            let document = pipeline.load(&args.task.path)?;
            match fs::write(dump_path, &document.text) {
                Ok(()) => info!("Extracted text saved to '{}'", dump_path.display()),
                Err(e) => warn!(
                    "Could not save extracted text to '{}': {e}",
                    dump_path.display()
                ),
            }
            pipeline.complete_document(&document, &options).await?
        }
    };

    if args.strict {
        let fields = parse_extraction_line(&completion)?;
        if args.json {
            println!("{}", serde_json::to_string(&fields)?);
            return Ok(());
        }
    }
    println!("{completion}");
    Ok(())
}

fn handle_render(config: &AppConfig, args: RenderArgs) -> Result<()> {
    let task = config.task(&args.task.task)?;
    let options = config.extraction_options(task, args.task.max_chars);
    let document = PdfLoader::new()
        .load(&args.task.path)
        .with_context(|| format!("Could not render a prompt for task '{}'", args.task.task))?;
    println!(
        "{}",
        render_prompt(&options.template, &document.text, options.max_chars)
    );
    Ok(())
}

fn handle_tasks(config: &AppConfig) {
    println!("Tasks:");
    for name in config.task_names() {
        let task = &config.tasks[name];
        println!(
            "  {name:<16} provider={:<16} max_chars={}",
            task.provider, task.max_chars
        );
    }

    let mut providers: Vec<_> = config.providers.iter().collect();
    providers.sort_unstable_by(|a, b| a.0.cmp(b.0));
    println!("Providers:");
    for (name, provider) in providers {
        println!(
            "  {name:<16} type={:<8} model={} url={}",
            provider.provider,
            provider.model_name,
            provider.api_url.as_deref().unwrap_or("(derived)")
        );
    }
}

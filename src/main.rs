//! HatchUp CLI entry point
//!
//! Subcommands:
//! - `hatchup chat` - interactive research chat with live sources
//! - `hatchup research <query>` - one-shot research query
//! - `hatchup analyze <file>` - deck text → data → memo → summary
//! - `hatchup workers` - list configured retrieval workers

use clap::Parser;
use futures::StreamExt;
use hatchup::analysis::MemoGenerator;
use hatchup::cli::output::Output;
use hatchup::cli::{Cli, Commands};
use hatchup::llm::Provider;
use hatchup::research::coordinator::ResearchCoordinator;
use hatchup::research::registry::WorkerRegistry;
use hatchup::research::session::SessionManager;
use hatchup::types::{AppError, Message, Result};
use hatchup::utils::config::HatchupConfig;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        Output::new().error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "hatchup=debug" } else { "hatchup=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let config = HatchupConfig::load_or_default(&cli.config)
        .map_err(|e| AppError::Config(e.to_string()))?;

    match cli.command {
        Commands::Chat => run_chat(&config, &output).await,
        Commands::Research {
            query,
            show_context,
        } => run_research(&config, &output, &query, show_context).await,
        Commands::Analyze { file } => run_analyze(&config, &output, &file).await,
        Commands::Workers => run_workers(&config, &output),
    }
}

fn build_coordinator(config: &HatchupConfig) -> Result<ResearchCoordinator> {
    let provider = Provider::from_config(&config.llm)?;
    let llm = provider.create_client(config.llm.temperature)?;

    let registry = WorkerRegistry::from_config(&config.research);
    let sessions = SessionManager::with_child_processes(registry);

    Ok(ResearchCoordinator::new(llm, sessions, &config.research))
}

/// Interactive research chat: each turn runs the live searches and streams
/// the answer.
async fn run_chat(config: &HatchupConfig, output: &Output) -> Result<()> {
    let coordinator = build_coordinator(config)?;
    output.banner();
    output.info("Ask about a market, startup, or trend. Type 'exit' to quit.");

    let stdin = std::io::stdin();
    let mut history: Vec<Message> = Vec::new();

    loop {
        output.prompt();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        output.info("Researching live sources...");
        let (_context, mut stream) = coordinator.answer_stream(question, &history).await?;

        let mut answer = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(text) => {
                    print!("{}", text);
                    let _ = std::io::stdout().flush();
                    answer.push_str(&text);
                }
                Err(e) => {
                    output.error(&e.to_string());
                    break;
                }
            }
        }
        println!();

        history.push(Message::user(question));
        history.push(Message::assistant(answer));
    }

    Ok(())
}

/// One-shot research: print the sources block (optionally) and the answer.
async fn run_research(
    config: &HatchupConfig,
    output: &Output,
    query: &str,
    show_context: bool,
) -> Result<()> {
    let coordinator = build_coordinator(config)?;

    output.info("Researching live sources...");
    let (context, mut stream) = coordinator.answer_stream(query, &[]).await?;

    if show_context {
        output.section("Sources");
        println!("{}", context);
    }

    output.section("Answer");
    while let Some(chunk) = stream.next().await {
        print!("{}", chunk?);
        let _ = std::io::stdout().flush();
    }
    println!();

    Ok(())
}

/// Deck analysis pipeline: structured data, memo, executive summary.
async fn run_analyze(config: &HatchupConfig, output: &Output, file: &Path) -> Result<()> {
    let deck_text = std::fs::read_to_string(file)
        .map_err(|e| AppError::InvalidInput(format!("Cannot read {}: {}", file.display(), e)))?;

    let provider = Provider::from_config(&config.llm)?;
    let llm = provider.create_client(config.llm.temperature)?;
    let generator = MemoGenerator::new(llm);

    output.info("Extracting structured data...");
    let (data, memo, summary) = generator.analyze(&deck_text).await?;

    output.section("Pitch Deck Data");
    println!("{}", to_pretty(&data)?);
    output.section("Investment Memo");
    println!("{}", to_pretty(&memo)?);
    output.section("Executive Summary");
    println!("{}", to_pretty(&summary)?);

    output.success(&format!("Analysis complete for {}", data.startup_name));
    Ok(())
}

/// List the configured registry entries.
fn run_workers(config: &HatchupConfig, output: &Output) -> Result<()> {
    let registry = WorkerRegistry::from_config(&config.research);

    output.section("Configured workers");
    for descriptor in registry.iter() {
        output.info(&format!(
            "{} ({}) -> {} [{}]",
            descriptor.name,
            descriptor.label,
            descriptor.operation,
            descriptor.launch_command(),
        ));
    }
    Ok(())
}

fn to_pretty<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("Failed to render output: {}", e)))
}

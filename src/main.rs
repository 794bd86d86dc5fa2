use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::Write;
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

mod cli;

use cli::Cli;
use cli::commands::Commands;
use garden_designer::config::Config;
use garden_designer::llm::OpenAiClient;
use garden_designer::tools::{InvocationStatus, ToolRegistry, design_layout};
use garden_designer::{Orchestrator, OrchestratorConfig, TurnReport};

fn setup_logging(level: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("garden-designer")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("garden-designer.log");

    // stdout carries the streamed answer, so logs go to a file
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_orchestrator(cli: &Cli, config: &Config) -> Result<Orchestrator<OpenAiClient>> {
    let mut client_config = config.llm.client_config();
    if let Some(model) = &cli.model {
        client_config.model = model.clone();
    }
    info!("Using model {} at {}", client_config.model, client_config.base_url);

    let client = OpenAiClient::from_env(&config.llm.api_key_env, client_config)
        .context("Failed to create LLM client")?;
    let registry = ToolRegistry::standard().context("Failed to register garden tools")?;
    let orchestrator_config = OrchestratorConfig {
        system_prompt: config.llm.system_prompt.clone(),
    };

    Ok(Orchestrator::with_config(Arc::new(client), registry, orchestrator_config))
}

/// Run one turn, streaming to stdout
///
/// Ctrl-C drops the turn wherever it is; nothing is committed and `None` is returned.
async fn run_turn(
    orchestrator: &mut Orchestrator<OpenAiClient>,
    prompt: &str,
    verbose: bool,
) -> Result<Option<TurnReport>> {
    let mut stdout = std::io::stdout();
    let mut sink = |fragment: &str| {
        // A closed stdout stops the stream
        if write!(stdout, "{}", fragment).and_then(|_| stdout.flush()).is_err() {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    };

    let report = tokio::select! {
        report = orchestrator.run_turn(prompt, &mut sink) => report?,
        _ = tokio::signal::ctrl_c() => {
            info!("Turn interrupted");
            println!();
            println!("{}", "(interrupted, turn not saved)".yellow());
            return Ok(None);
        }
    };
    println!();

    if report.cancelled {
        println!("{}", "(output closed, turn not saved)".yellow());
    }
    if verbose {
        for invocation in &report.invocations {
            let status = match invocation.status {
                InvocationStatus::Parsed => "ok".green(),
                InvocationStatus::Fallback => "fallback".yellow(),
                InvocationStatus::UnknownTool => "unknown tool".red(),
                InvocationStatus::InvalidArguments => "invalid arguments".red(),
            };
            println!("{} {} ({})", "tool:".cyan(), invocation.name, status);
        }
        println!(
            "{} {} turns in memory",
            "memory:".cyan(),
            orchestrator.memory().len()
        );
    }

    Ok(Some(report))
}

async fn handle_ask_command(prompt: &[String], cli: &Cli, config: &Config) -> Result<()> {
    let prompt = prompt.join(" ");
    info!("Single turn: {}", prompt);
    let mut orchestrator = build_orchestrator(cli, config)?;
    run_turn(&mut orchestrator, &prompt, cli.is_verbose()).await?;
    Ok(())
}

async fn handle_chat_command(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting chat session");
    let mut orchestrator = build_orchestrator(cli, config)?;

    println!("{}", "Describe the garden you want. Type 'exit' to quit.".green());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", ">".green().bold());
        std::io::stdout().flush().context("Failed to flush stdout")?;

        // Ctrl-C at the prompt ends the session
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }
        if prompt.eq_ignore_ascii_case("exit") || prompt.eq_ignore_ascii_case("quit") {
            break;
        }

        // A failed turn ends that turn only
        if let Err(e) = run_turn(&mut orchestrator, prompt, cli.is_verbose()).await {
            log::error!("Turn failed: {:?}", e);
            println!("{} {}", "Error:".red(), e);
        }
    }

    info!("Chat ended after {} turns", orchestrator.memory().len());
    Ok(())
}

fn handle_tools_command() -> Result<()> {
    let registry = ToolRegistry::standard().context("Failed to register garden tools")?;
    let schemas: Vec<serde_json::Value> = registry
        .descriptors()
        .iter()
        .map(|d| d.to_openai_schema())
        .collect();
    println!("{}", serde_json::to_string_pretty(&schemas)?);
    Ok(())
}

fn handle_layout_command(theme: &str, plants: &[String]) -> Result<()> {
    info!("Local layout for {} plants", plants.len());
    print!("{}", design_layout(plants, theme));
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None | Some(Commands::Chat) => handle_chat_command(cli, config).await,
        Some(Commands::Ask { prompt }) => handle_ask_command(prompt, cli, config).await,
        Some(Commands::Tools) => handle_tools_command(),
        Some(Commands::Layout { theme, plants }) => handle_layout_command(theme, plants),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(config.log_level.as_deref().unwrap_or("info")).context("Failed to setup logging")?;
    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}

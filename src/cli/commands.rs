//! CLI commands implementation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{load_settings, Settings};
use crate::llm::{LlmClient, LlmConfig, LlmProvider};
use crate::services::LabelPipeline;

#[derive(Parser)]
#[command(name = "pdflabel")]
#[command(about = "Batch PDF labeling using local and hosted LLMs")]
#[command(version)]
pub struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Label every PDF in a directory and export the results table
    Run {
        /// Directory of PDF files (defaults to the configured input directory)
        dir: Option<PathBuf>,
        /// Output table path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Model to use for label generation
        #[arg(short, long)]
        model: Option<String>,
        /// LLM endpoint
        #[arg(long)]
        endpoint: Option<String>,
        /// Leading pages to extract per document (0 = all pages)
        #[arg(long)]
        pages: Option<usize>,
        /// Limit number of documents to process (0 = unlimited)
        #[arg(short, long, default_value = "0")]
        limit: usize,
    },

    /// List models available on the Ollama endpoint
    Models,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut settings, config) = load_settings(cli.config.as_deref()).await;

    match cli.command {
        Commands::Run {
            dir,
            output,
            model,
            endpoint,
            pages,
            limit,
        } => {
            if let Some(dir) = dir {
                settings.input_dir = dir;
            }
            if let Some(output) = output {
                settings.output_path = output;
            }
            if let Some(pages) = pages {
                settings.page_limit = pages;
            }
            settings.doc_limit = limit;

            let mut llm_config = config.llm.clone();
            if let Some(ep) = endpoint {
                llm_config.endpoint = ep;
            }
            if let Some(m) = model {
                llm_config.model = m;
            }

            cmd_run(&settings, llm_config).await
        }
        Commands::Models => cmd_models(config.llm.clone()).await,
    }
}

/// Label all PDFs in the input directory and export the table.
async fn cmd_run(settings: &Settings, llm_config: LlmConfig) -> anyhow::Result<()> {
    let client = LlmClient::new(llm_config)?;
    let llm_config = client.config();

    if client.is_available().await {
        println!(
            "{} Connected to LLM at {} (model: {})",
            style("✓").green(),
            llm_config.endpoint,
            llm_config.model
        );
    } else {
        println!(
            "{} LLM service not available at {}",
            style("!").yellow(),
            llm_config.endpoint
        );
        if llm_config.provider == LlmProvider::Ollama {
            println!("  Make sure Ollama is running: ollama serve");
        }
        println!("  Documents will fall back to the failure label if it stays unreachable");
    }

    println!(
        "{} Labeling PDFs in {}",
        style("→").cyan(),
        settings.input_dir.display()
    );

    let pipeline = LabelPipeline::new(settings, llm_config, &client);
    let summary = pipeline.run().await?;

    println!(
        "{} Labeling complete: {} labeled, {} without text, {} failed",
        style("✓").green(),
        summary.labeled,
        summary.empty,
        summary.failed
    );
    println!(
        "  {} {} labels saved in {}",
        style("→").dim(),
        summary.total,
        settings.output_path.display()
    );

    Ok(())
}

/// List models installed on the Ollama endpoint.
async fn cmd_models(llm_config: LlmConfig) -> anyhow::Result<()> {
    let endpoint = llm_config.endpoint.clone();
    let client = LlmClient::new(llm_config)?;

    match client.list_models().await {
        Ok(models) if models.is_empty() => {
            println!("{} No models installed at {}", style("!").yellow(), endpoint);
            println!("  Pull one with: ollama pull phi3:mini");
        }
        Ok(models) => {
            println!("{} Models available at {}:", style("✓").green(), endpoint);
            for model in models {
                println!("  {}", model);
            }
        }
        Err(e) => {
            println!("{} Could not reach {}: {}", style("✗").red(), endpoint, e);
            println!("  Make sure Ollama is running: ollama serve");
        }
    }

    Ok(())
}

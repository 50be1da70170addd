mod config;
mod gemini;
mod llm;
mod perplexity;
mod research;
mod tools;
mod wikipedia;

pub const USER_AGENT: &str = concat!("unirank/", env!("CARGO_PKG_VERSION"), " (MCP Server)");

use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use tokio::sync::mpsc;
use tracing::info;

use config::Config;
use research::{ProgressEvent, ResearchRequest};
use tools::UniRank;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server over stdio (default)
    Serve,
    /// Research once and print the result as JSON
    Research {
        /// Country to research universities in
        country: String,
        /// Course or field of study
        #[arg(long)]
        course: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("unirank=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let unirank = UniRank::new(&config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(unirank).await,
        Command::Research { country, course } => research_once(&unirank, &country, course).await,
    }
}

async fn serve(unirank: UniRank) -> Result<(), Box<dyn std::error::Error>> {
    info!("starting unirank MCP server");

    let service = unirank
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("failed to start server: {e}"))?;

    service.waiting().await?;
    info!("server stopped");
    Ok(())
}

async fn research_once(
    unirank: &UniRank,
    country: &str,
    course: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let request =
        ResearchRequest::new(country, course.as_deref()).ok_or("country must not be empty")?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Ok(line) = serde_json::to_string(&event) {
                eprintln!("{line}");
            }
        }
    });

    let result = unirank.research(&request, Some(&tx)).await;
    drop(tx);
    printer.await?;

    let result = result?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

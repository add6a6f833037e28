//! Web-based AI alt-text generator.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ai_alt_generator::client::{
    render_snippet, SelectedFile, SessionState, UploadController, Uploader, DEFAULT_ENDPOINT,
};
use ai_alt_generator::{edge, EdgeConfig, OpenAiCompatibleProviderBuilder, ProviderConfig};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ai-alt-generator")]
#[command(about = "Generate alt text and long descriptions for images with a vision-language model")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the edge handler and upload page (default)
    Serve,

    /// Describe a local image through a running edge handler
    Describe(DescribeArgs),
}

#[derive(Args)]
struct DescribeArgs {
    /// Image file to describe
    file: PathBuf,

    /// Edge handler URL
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// Also print the HTML snippet
    #[arg(long)]
    html: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve().await,
        Commands::Describe(args) => describe(args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ai_alt_generator=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn serve() -> anyhow::Result<()> {
    let config = EdgeConfig::from_env().context("invalid server configuration")?;
    let provider = OpenAiCompatibleProviderBuilder::from_config(&ProviderConfig::from_env()).build();

    tracing::info!(
        model = %config.model,
        temperature = config.temperature,
        inference = provider.endpoint(),
        "configured inference provider"
    );

    let addr = config.addr;
    let route = config.route.clone();
    let page_route = config.page_route.clone();
    let app = edge::router(config, Arc::new(provider))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("🚀 Server running on http://{addr}");
    tracing::info!("📸 Upload page at {page_route}, edge handler at {route}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn describe(args: DescribeArgs) -> anyhow::Result<()> {
    let file = SelectedFile::from_path(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let uploader = Uploader::builder()
        .endpoint(args.endpoint)
        .timeout(Duration::from_secs(args.timeout_secs))
        .min_display(Duration::ZERO)
        .build()?;
    let (mut controller, _notices) = UploadController::new(uploader);

    if let Some(task) = controller.select(file) {
        task.await?;
    }

    let session = controller.snapshot();
    let result = match session.state() {
        SessionState::Success { result, .. } => result,
        _ => match session.error() {
            Some(error) => anyhow::bail!("{error}"),
            None => anyhow::bail!("upload did not complete"),
        },
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("Alt text: {}", result.alt_text);
    println!("Long description: {}", result.long_desc);
    if args.html {
        println!();
        println!("{}", render_snippet(result));
    }
    Ok(())
}

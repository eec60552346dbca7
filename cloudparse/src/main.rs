use anyhow::Result;
use clap::Parser;
use cloudparse::cli::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment before anything reads CLOUDPARSE_* variables.
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    tracing::info!("cloudparse startup: tracing initialised, arguments parsed");

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "cloudparse exited with error");
        return Err(e);
    }
    tracing::info!("cloudparse completed successfully");
    Ok(())
}

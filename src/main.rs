use anyhow::Result;
use clap::Parser;
use voicepay::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_tracing()?;
    cli.run().await
}

use clap::Parser;
use kamer_chat::{Cli, explain};
use kamer_chat_host::run as run_host;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        tracing::error!(error = %format!("{err:#}"), "kamer chat failed");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    if cli.config_explain {
        println!("{}", explain(&config)?);
        return Ok(());
    }
    run_host(config).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

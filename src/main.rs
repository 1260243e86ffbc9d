use chrono::Local;
use tracing_subscriber::EnvFilter;
use umascrap::{info_time, process::process_site, Config, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let start_time = Local::now();
    let config = Config::from_env();
    process_site(&config).await?;
    info_time!(start_time, "Full program time:");

    Ok(())
}

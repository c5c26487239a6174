use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use minidns::{Config, RecordStore, SharedConfig};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("minidns".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    tracing_init(config.log_file.as_deref())?;

    tracing::info!("loading records from {}", config.records.display());
    let store = Arc::new(RecordStore::load(&config.records).await?);
    tracing::info!("loaded {} records", store.len());

    let dns_server = minidns::dns::new(&config, store).await?;
    tracing::info!("DNS listening on UDP {}", dns_server.local_addr()?);
    let dns_handle = tokio::spawn(dns_server.block_until_done());

    // TODO: drain in-flight replies before exiting on a signal.
    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        dns_res = dns_handle => {
            dns_res?;
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init(log_file: Option<&Path>) -> Result<()> {
    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "minidns=info".into()),
    );
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
            .init(),
    }
    Ok(())
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            Ok(Arc::new(config))
        }
    }
}

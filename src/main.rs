use anyhow::{anyhow, Result};
use axfrcheck::{Config, SharedConfig};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("axfrcheck".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    log_sources(&config);

    tracing::info!("API listening on {}", &config.listen);
    let api_server = axfrcheck::new_http(config.clone())?;
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "axfrcheck=info,tower_http=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}

fn log_sources(config: &Config) {
    match config.source_ip4 {
        Some(ip) => tracing::info!("IPv4 transfers from {ip}"),
        None => tracing::info!("IPv4 transfers from a system chosen address"),
    }
    match config.source_ip6 {
        Some(ip) => tracing::info!("IPv6 transfers from {ip}"),
        None => tracing::info!("IPv6 transfers from a system chosen address"),
    }
}

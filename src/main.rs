use clap::{Parser, Subcommand};
use std::io::Read;
use std::sync::Arc;
use tracing_subscriber::{prelude::*, reload, EnvFilter};
use wasend_core::{
    config,
    item::Item,
    traits::{ItemParameters, StaticCredentials},
};
use wasend_whatsapp::{
    description::{describe, subtitle, NODE},
    CredentialTestStatus, MessageSender, ReqwestClient,
};

#[derive(Parser)]
#[command(
    name = "wasend",
    version,
    about = "wasend: send WhatsApp Cloud API messages from workflow items"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Overrides `credentials.accessToken`.
    #[arg(long, env = "WHATSAPP_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Overrides `credentials.phoneNumberId`.
    #[arg(long, env = "WHATSAPP_PHONE_NUMBER_ID")]
    phone_number_id: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message per input item and print the result items.
    Send {
        /// JSON file with the input items. Reads stdin when omitted.
        #[arg(short, long)]
        items: Option<String>,

        /// Capture per-item failures instead of aborting the run.
        #[arg(long)]
        continue_on_fail: bool,
    },
    /// Check the configured credentials against the Graph API.
    TestCredentials,
    /// Print the node's parameter and credential declarations as JSON.
    Describe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    // Logging is up before the config loads; the configured level is
    // swapped in afterwards.
    let (filter, filter_handle) =
        reload::Layer::new(EnvFilter::new(filter_directive(rust_log.as_deref(), "info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut cfg = config::load(&cli.config)?;
    filter_handle.reload(EnvFilter::new(filter_directive(
        rust_log.as_deref(),
        &cfg.log_level,
    )))?;

    if let Some(token) = cli.access_token {
        cfg.credentials.access_token = token;
    }
    if let Some(id) = cli.phone_number_id {
        cfg.credentials.phone_number_id = id;
    }

    let sender = MessageSender::new(
        Arc::new(ReqwestClient::new()),
        Arc::new(StaticCredentials(cfg.credentials.clone())),
    )
    .with_base_url(cfg.api_base_url.clone());

    match cli.command {
        Commands::Send {
            items,
            continue_on_fail,
        } => {
            let raw = match items {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| anyhow::anyhow!("failed to read {path}: {e}"))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let items = parse_items(&raw)?;

            let use_buttons = cfg
                .parameters
                .get("useButtons")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            tracing::info!(
                "{} v{} ({})",
                NODE.display_name,
                NODE.version,
                subtitle(use_buttons)
            );

            let results = sender
                .execute(
                    &items,
                    &ItemParameters(cfg.parameters.clone()),
                    continue_on_fail || cfg.continue_on_fail,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Commands::TestCredentials => {
            // The test request goes out regardless; this only flags gaps.
            if let Err(e) = cfg.credentials.validate() {
                tracing::warn!("{e}");
            }
            let result = sender.test_credentials().await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.status == CredentialTestStatus::Error {
                anyhow::bail!("credential test failed: {}", result.message);
            }
        }
        Commands::Describe => {
            println!("{}", serde_json::to_string_pretty(&describe())?);
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn filter_directive(rust_log: Option<&str>, configured: &str) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive.to_string(),
        _ => configured.to_string(),
    }
}

/// Accepts a JSON array of items, a single item, or nothing (one empty item).
fn parse_items(raw: &str) -> anyhow::Result<Vec<Item>> {
    if raw.trim().is_empty() {
        return Ok(vec![Item::default()]);
    }
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("input items are not valid JSON: {e}"))?;
    Ok(match value {
        serde_json::Value::Array(values) => values.into_iter().map(Item::from_value).collect(),
        other => vec![Item::from_value(other)],
    })
}

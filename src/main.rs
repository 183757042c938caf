use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use luxio::AppState;
use luxio::catalog::{BuiltinSource, CatalogSource, FallbackSource, JsonFileSource};
use luxio::config::Config;
use luxio::email::OrderNotifier;
use luxio::payments::{self, MaxelpayClient, PaymentGateway};
use luxio::storage::{FileStorage, MemoryStorage, StorageAdapter};

#[derive(Parser)]
#[command(name = "luxio", version, about = "LUXIO storefront backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Product catalog JSON file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Print the signature header for a webhook body, signed with MAXELPAY_SECRET
    SignWebhook {
        /// File containing the exact request body
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("luxio=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
        catalog: None,
    }) {
        Command::Serve { host, port, catalog } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(catalog) = catalog {
                config.catalog_path = catalog;
            }
            serve(config).await
        }
        Command::SignWebhook { file } => {
            let secret = config
                .webhook_secret
                .context("MAXELPAY_SECRET must be set to sign webhook bodies")?;
            let body = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            println!("{}", payments::signature_header_value(&body, &secret));
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.dev_mode {
        tracing::warn!("Development mode: error details are returned to clients");
    }

    let gateway: Option<Arc<dyn PaymentGateway>> = match &config.gateway {
        Some(gateway_config) => {
            let client = MaxelpayClient::new(gateway_config).context("failed to build gateway client")?;
            tracing::info!(endpoint = %gateway_config.endpoint, "Payment gateway configured");
            Some(Arc::new(client))
        }
        None => {
            tracing::warn!("MAXELPAY_KEY/MAXELPAY_SECRET not set, payment creation disabled");
            None
        }
    };

    if config.webhook_secret.is_none() {
        tracing::warn!("MAXELPAY_SECRET not set, webhooks will be rejected");
    }

    let notifier = match &config.mail {
        Some(mail_config) => match OrderNotifier::from_config(mail_config, config.locale) {
            Ok(notifier) => {
                tracing::info!(host = %mail_config.host, port = mail_config.port, "SMTP configured");
                Some(Arc::new(notifier))
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid mail settings, order confirmation disabled");
                None
            }
        },
        None => {
            tracing::warn!("Mail settings incomplete, order confirmation disabled");
            None
        }
    };

    let source = FallbackSource::new(JsonFileSource::new(&config.catalog_path), BuiltinSource);
    let catalog = source
        .load()
        .await
        .context("failed to load product catalog")?;
    tracing::info!(
        path = %config.catalog_path.display(),
        products = catalog.len(),
        "Catalog loaded"
    );

    let storage: Arc<dyn StorageAdapter> = match &config.cart_store_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using file-backed cart storage");
            Arc::new(FileStorage::open(path).context("failed to open cart storage")?)
        }
        None => Arc::new(MemoryStorage::new()),
    };

    let state = AppState {
        gateway,
        webhook_secret: config.webhook_secret.clone(),
        notifier,
        catalog: Arc::new(catalog),
        storage,
        default_origin: config.default_origin.clone(),
        expose_error_details: config.dev_mode,
    };

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "LUXIO backend listening");

    axum::serve(listener, luxio::app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}

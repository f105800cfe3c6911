// CLI command implementations
// Load configuration, bind, wire up backends and serve until a signal arrives

use super::{error, info, print_banner, success, warning, Commands, ServiceArgs};
use crate::config::{parse_bind_addr, MarketConfig};
use crate::customer::{CustomerDb, RemoteCustomerDb};
use crate::frontend::{Backends, BuyerServer, SellerServer};
use crate::network::{self, Service};
use crate::product::ProductDb;
use crate::signals::{self, ShutdownCoordinator};
use anyhow::Result;
use colored::*;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info as log_info;

/// Execute a CLI command
pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::CustomerDb(args) => customer_db_command(args).await,
        Commands::ProductDb(args) => product_db_command(args).await,
        Commands::SellerServer(args) => seller_server_command(args).await,
        Commands::BuyerServer(args) => buyer_server_command(args).await,
        Commands::Validate { file } => validate_command(&file),
    }
}

async fn customer_db_command(args: ServiceArgs) -> Result<()> {
    let config = MarketConfig::load(&args.config)?;
    let listener = listen(&args, &config.server.customer_db_bind, &config)?;

    let db = Arc::new(CustomerDb::new(&config.sessions));
    let sweeper = db.sweeper(&config.sessions);
    sweeper.start();

    let result = serve_until_signal(listener, db, &config).await;

    let stats = sweeper.stats();
    log_info!(sweeps = stats.sweeps, evicted = stats.evicted, "Customer Database stopped");
    result
}

async fn product_db_command(args: ServiceArgs) -> Result<()> {
    let config = MarketConfig::load(&args.config)?;
    let listener = listen(&args, &config.server.product_db_bind, &config)?;

    let customer = Arc::new(RemoteCustomerDb::new(config.upstream.customer_db_addr.clone()));
    let db = Arc::new(ProductDb::new(customer));

    serve_until_signal(listener, db, &config).await
}

async fn seller_server_command(args: ServiceArgs) -> Result<()> {
    let config = MarketConfig::load(&args.config)?;
    let listener = listen(&args, &config.server.seller_server_bind, &config)?;

    let server = Arc::new(SellerServer::new(Backends::remote(&config.upstream)));
    serve_until_signal(listener, server, &config).await
}

async fn buyer_server_command(args: ServiceArgs) -> Result<()> {
    let config = MarketConfig::load(&args.config)?;
    let listener = listen(&args, &config.server.buyer_server_bind, &config)?;

    let server = Arc::new(BuyerServer::new(Backends::remote(&config.upstream)));
    serve_until_signal(listener, server, &config).await
}

/// Bind the service socket; `--bind` wins over the configured address
fn listen(args: &ServiceArgs, configured: &str, config: &MarketConfig) -> Result<TcpListener> {
    let requested = args.bind.as_deref().unwrap_or(configured);
    let addr = parse_bind_addr(requested)?;

    network::bind(addr, &config.network).map_err(|e| {
        error(&format!("Cannot listen on {}: {:#}", addr, e));
        e
    })
}

async fn serve_until_signal<S: Service>(
    listener: TcpListener,
    service: Arc<S>,
    config: &MarketConfig,
) -> Result<()> {
    let addr = listener.local_addr()?;
    print_banner(service.name(), &addr.to_string());

    let coordinator = Arc::new(ShutdownCoordinator::new());
    let shutdown = coordinator.subscribe();
    coordinator.clone().trigger_on(signals::create_shutdown_listener()?);

    network::serve(listener, service, config.network.clone(), shutdown).await
}

/// Validate configuration
fn validate_command(file: &str) -> Result<()> {
    info(&format!("Validating {}", file.bright_white()));

    if !std::path::Path::new(file).exists() {
        warning("File not found; checking defaults with environment overrides");
    }

    match MarketConfig::load(file) {
        Ok(config) => {
            success("Configuration is valid");
            println!();
            println!("  {} {}", "Customer DB:".bright_white(), config.server.customer_db_bind);
            println!("  {} {}", "Product DB:".bright_white(), config.server.product_db_bind);
            println!("  {} {}", "Seller Server:".bright_white(), config.server.seller_server_bind);
            println!("  {} {}", "Buyer Server:".bright_white(), config.server.buyer_server_bind);
            println!(
                "  {} {}s (sweep every {}s)",
                "Session timeout:".bright_white(),
                config.sessions.timeout_secs,
                config.sessions.sweep_interval_secs
            );
            Ok(())
        }
        Err(e) => {
            error(&format!("Configuration is invalid: {:#}", e));
            Err(e)
        }
    }
}

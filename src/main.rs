//! Farebox - transit card account, media, and balance transaction API
//!
//! A REST API over SQLite managing subscriber accounts, their cards
//! (media), and the append-only ledger of recharge/usage transactions.

mod account;
mod api;
mod config;
mod context;
mod db;
mod error;
mod ledger;
mod media;
mod server;
mod validation;

use config::ServerConfig;
use context::AppContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farebox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    // Load configuration
    let config = ServerConfig::from_env()?;

    // Create application context
    let ctx = AppContext::new(config).await?;

    // Start server
    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
   __                _
  / _| __ _ _ __ ___| |__   _____  __
 | |_ / _` | '__/ _ \ '_ \ / _ \ \/ /
 |  _| (_| | | |  __/ |_) | (_) >  <
 |_|  \__,_|_|  \___|_.__/ \___/_/\_\

        Transit media & balance API v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}

//! ComplyFlow 网关入口
//!
//! 启动: cargo run --bin complyflow
//!
//! 必填配置（config/default.toml 或环境变量）:
//! - COMPLYFLOW__AGENT__PROJECT_ID
//! - COMPLYFLOW__AGENT__AGENT_ID

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use complyflow::config::load_config;
use complyflow::server::create_router;
use complyflow::{observability, ChatGateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::var("COMPLYFLOW_CONFIG").ok().map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;
    cfg.validate().context("Invalid config")?;
    let cfg = Arc::new(cfg);

    let gateway = ChatGateway::from_config(cfg.clone()).context("Failed to build gateway")?;
    let app = create_router(Arc::new(gateway));

    let addr: SocketAddr = cfg
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address: {}", cfg.server.bind_addr))?;

    tracing::info!("ComplyFlow gateway listening on http://{}", addr);
    tracing::info!("Agent: {}", cfg.agent.agent_path());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

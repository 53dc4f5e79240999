use std::sync::Arc;

use anyhow::Context;

use hotelgate_api::app::{AppState, build_app};
use hotelgate_auth::HttpCredentialExchange;
use hotelgate_core::OriginUrl;
use hotelgate_routing::GateConfig;
use hotelgate_shell::ShellTable;

const ENV_BIND: &str = "HOTELGATE_BIND";
const ENV_AUTH_UPSTREAM: &str = "HOTELGATE_AUTH_UPSTREAM";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hotelgate_observability::init("hotelgate-api");

    let config = GateConfig::from_env().context("invalid gate configuration")?;
    if config.handoff_secret.is_none() {
        tracing::warn!("HOTELGATE_HANDOFF_SECRET not set; services share the login origin's cookies");
    }
    let shell = ShellTable::from_env().context("invalid shell configuration")?;

    let mut state = AppState::new(config, shell);
    if let Ok(upstream) = std::env::var(ENV_AUTH_UPSTREAM) {
        let base = OriginUrl::parse(&upstream).with_context(|| format!("{ENV_AUTH_UPSTREAM}: '{upstream}'"))?;
        tracing::info!(upstream = %base, "using remote credential exchange");
        let exchange = Arc::new(HttpCredentialExchange::new(base));
        state = state.with_exchange(exchange.clone(), Some(exchange));
    } else {
        tracing::warn!("{ENV_AUTH_UPSTREAM} not set; using the built-in demo directory");
    }

    let app = build_app(state);

    let bind = std::env::var(ENV_BIND).unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

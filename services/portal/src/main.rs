//! InternHub portal HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, storage, the session signer, and the HTTP router, then
//! serves the API next to the Prometheus metrics endpoint.
//!
//! # Notes
//! The `build_state` helper keeps wiring testable and minimizes main setup logic.
use anyhow::Context;
use chrono::Utc;
use portal::app::{AppState, build_router};
use portal::auth::keys::{generate_signing_key, signing_key_from_hex_seed};
use portal::auth::session_token::SessionSigner;
use portal::config::PortalConfig;
use portal::observability;
use portal::store::memory::InMemoryStore;
use portal::store::seed::demo_data;
use portal::store::PortalStore;
use std::future::Future;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PortalConfig::from_env_or_yaml().context("portal config")?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: PortalConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("internhub-portal");
    let state = build_state(config.clone())?;
    let metrics_task = tokio::spawn(observability::serve_metrics(
        metrics_handle,
        config.metrics_bind,
    ));

    let app = build_router(state.clone());

    let addr = config.bind_addr;
    tracing::info!(
        %addr,
        backend = state.store.backend_name(),
        signing_kid = state.signer.kid(),
        "portal listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }

    metrics_task.abort();
    let _ = metrics_task.await;
    Ok(())
}

fn build_state(config: PortalConfig) -> anyhow::Result<AppState> {
    let signing_key = match config.signing_key_seed.as_deref() {
        Some(seed) => signing_key_from_hex_seed(seed).context("INTERNHUB_SIGNING_KEY_SEED")?,
        None => {
            tracing::warn!("no signing key seed configured; sessions will not survive a restart");
            generate_signing_key()
        }
    };
    let signer = SessionSigner::new(&signing_key).context("session signer")?;

    let store: Arc<dyn PortalStore + Send + Sync> = if config.seed_demo_data {
        Arc::new(InMemoryStore::seeded(demo_data(Utc::now())))
    } else {
        Arc::new(InMemoryStore::new())
    };
    if config.echo_codes {
        tracing::warn!("one-time codes are echoed in API responses");
    }

    Ok(AppState {
        api_version: "v1".to_string(),
        store,
        signer: Arc::new(signer),
        auth: config.auth_settings(),
    })
}

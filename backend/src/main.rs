//! Backend entry-point: loads settings, wires adapters and serves the
//! marketplace API until interrupted.

mod server;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use realscape::inbound::http::health::HealthState;
use realscape::inbound::http::session_config::{
    DeploymentMode, fingerprint::secret_fingerprint, session_settings_from_env,
};
use realscape::outbound::persistence::{DbPool, run_pending_migrations};
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("loading server settings")?;
    let env = DefaultEnv::new();
    let mode = DeploymentMode::detect(&env)?;
    let session = session_settings_from_env(&env, mode)?;
    info!(
        ?mode,
        fingerprint = %secret_fingerprint(&session.secret),
        secure = session.cookie.secure,
        "session credential settings loaded"
    );

    let mut config = ServerConfig::new(
        session.secret,
        session.cookie,
        settings.bind_addr()?,
        settings.route_policy()?,
    );
    if let Some(pool_config) = settings.pool_config() {
        run_pending_migrations(pool_config.database_url())
            .await
            .wrap_err("applying database migrations")?;
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("creating database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let handle = server.handle();

    actix_web::rt::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown requested; draining workers");
        health_state.mark_unhealthy();
        handle.stop(true).await;
    });

    server.await?;
    Ok(())
}

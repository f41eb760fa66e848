//! Employee handbook API server.
//!
//! Configuration comes from the environment (see [`AppConfig::from_env`]).
//! The handbook is loaded from Postgres when `DATABASE_URL` is set, seeding
//! an empty database from `HANDBOOK_SEED` if one is given. Without a
//! database the seed file (or an empty handbook) is served from memory.

use std::net::SocketAddr;

use anyhow::Context;
use handbook_api::state::{AppConfig, AppState};
use handbook_core::{Handbook, HandbookSeed};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(config.json_logs);

    let pool = handbook_api::db::init_pool()
        .await
        .context("failed to initialize database")?;
    let handbook = load_handbook(&config, pool.as_ref()).await?;
    tracing::info!(
        sections = handbook.section_count(),
        policies = handbook.policy_count(),
        published = handbook.published_count(),
        "handbook ready"
    );

    let port = config.port;
    let state = AppState::with_config(config, handbook, pool);
    let app = handbook_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("handbook-api listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app.into_make_service())
        .await
        .context("server error")?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn load_handbook(config: &AppConfig, pool: Option<&PgPool>) -> anyhow::Result<Handbook> {
    let seeded = match &config.seed_path {
        Some(path) => {
            let handbook = HandbookSeed::from_path(path)
                .and_then(HandbookSeed::into_handbook)
                .with_context(|| format!("invalid seed file {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded seed file");
            Some(handbook)
        }
        None => None,
    };

    let Some(pool) = pool else {
        return Ok(seeded.unwrap_or_default());
    };

    if let Some(handbook) = &seeded {
        if handbook_api::db::handbook::is_empty(pool).await? {
            handbook_api::db::handbook::import(pool, handbook)
                .await
                .context("failed to import seed into database")?;
            tracing::info!("imported seed into empty database");
        } else {
            tracing::info!("database already populated, ignoring seed file");
        }
    }

    handbook_api::db::handbook::load(pool)
        .await
        .context("failed to load handbook from database")
}

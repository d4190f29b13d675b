//! `vrisa-aqi` HTTP service: measurement intake, AQI queries and backfill.
//!
//! Startup order: tracing, `.env`, config, PostgreSQL pool, idempotent
//! schema and catalog seed, then the `routes` gateway on port 8080.
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**) – PostgreSQL connection string
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `BACKFILL_BATCH_SIZE` (optional) – AQI rows per backfill write (default: 500)
//! - `WAQI_FEED_URL`, `WAQI_SENSOR_ID` (optional) – real-data ingestion
//! - `AXUM_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AXUM_SPAN_EVENTS` (optional) – span event mode for tracing
use std::{env, net::SocketAddr};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use vrisa_aqi::{config, routes, schema, PgStore};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    tracing::info!("Connected to database (pool max {})", cfg.db_pool_max);

    schema::create_schema(&pool).await?;

    if cfg.waqi_feed_url.is_none() {
        tracing::info!("WAQI ingestion disabled; POST /ingest/waqi will answer 503");
    }

    let app: Router = routes::router(PgStore::new(pool), cfg);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8080));
    tracing::info!("vrisa-aqi listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Install the global fmt subscriber. Must run before the first log macro.
///
/// - `AXUM_SPAN_EVENTS`: `full` or `enter_exit`; span CLOSE events otherwise
/// - `FORCE_COLOR`: `1|true|yes` / `0|false|no`; TTY detection otherwise
/// - `RUST_LOG` wins over `AXUM_LOG_LEVEL` (default `debug`)
fn init_tracing() {
    // ---
    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events())
        .with_env_filter(log_filter())
        .with_ansi(use_color())
        .compact()
        .init();
}

fn span_events() -> FmtSpan {
    match env::var("AXUM_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    }
}

fn use_color() -> bool {
    match env::var("FORCE_COLOR").as_deref() {
        Ok("1" | "true" | "yes") => true,
        Ok("0" | "false" | "no") => false,
        _ => std::io::stdout().is_terminal(),
    }
}

/// sqlx statement logging is capped at `warn` unless `RUST_LOG` says otherwise.
fn log_filter() -> EnvFilter {
    // ---
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    let level = env::var("AXUM_LOG_LEVEL")
        .ok()
        .filter(|l| matches!(l.as_str(), "trace" | "debug" | "info" | "warn" | "error"))
        .unwrap_or_else(|| "debug".to_string());
    EnvFilter::new(format!("{level},sqlx::query=warn"))
}

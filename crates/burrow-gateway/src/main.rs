use std::sync::Arc;

use anyhow::Context;
use burrow_cache::{MokaUrlCache, RedisUrlCache};
use burrow_core::{Repository, UrlCache};
use burrow_gateway::app::RESERVED_CODES;
use burrow_gateway::cli::{CacheBackendArg, StorageBackendArg, CLI};
use burrow_gateway::tasks::spawn_purge_task;
use burrow_gateway::{App, AppState};
use burrow_generator::RandomGenerator;
use burrow_shortener::{ShortenerConfig, ShortenerService};
use burrow_storage::{InMemoryRepository, MySqlRepository};
use clap::Parser;
use jiff::SignedDuration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CLI::parse();

    burrow_telemetry::init(cli.log_format)?;

    info!(
        listen_addr = %cli.listen_addr,
        base_url = %cli.base_url,
        storage_backend = %cli.storage,
        cache_backend = %cli.cache,
        code_length = cli.code_length,
        "starting burrow gateway"
    );

    match cli.storage {
        StorageBackendArg::InMemory => with_cache(&cli, InMemoryRepository::new()).await,
        StorageBackendArg::Mysql => {
            let dsn = cli
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(dsn)
                .await
                .context("failed to connect to mysql")?;
            repository
                .ensure_schema()
                .await
                .context("failed to create mysql schema")?;
            with_cache(&cli, repository).await
        }
    }
}

async fn with_cache<R: Repository>(cli: &CLI, repository: R) -> anyhow::Result<()> {
    match cli.cache {
        CacheBackendArg::Moka => {
            serve(cli, repository, MokaUrlCache::with_capacity(cli.cache_capacity)).await
        }
        CacheBackendArg::Redis => {
            let redis_url = cli
                .redis_url
                .as_deref()
                .context("redis url is required when cache backend is redis")?;
            let cache = RedisUrlCache::connect(redis_url)
                .await
                .context("failed to connect to redis")?;
            serve(cli, repository, cache).await
        }
    }
}

async fn serve<R: Repository, C: UrlCache>(
    cli: &CLI,
    repository: R,
    cache: C,
) -> anyhow::Result<()> {
    let generator =
        RandomGenerator::new(usize::from(cli.code_length)).context("invalid code length")?;
    let config = ShortenerConfig::builder()
        .base_url(cli.base_url.clone())
        .default_duration(SignedDuration::from_hours(i64::from(
            cli.default_duration_hours,
        )))
        .max_attempts(cli.max_attempts)
        .reserved_codes(RESERVED_CODES)
        .build();

    let repository = Arc::new(repository);
    let service =
        ShortenerService::from_shared(Arc::clone(&repository), Arc::new(cache), generator, config);
    let purge_handle = spawn_purge_task(repository, cli.cleanup_interval());

    let router = App::router(AppState::new(Arc::new(service)), cli.request_timeout());
    let listener = TcpListener::bind(cli.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = purge_handle {
        handle.abort();
    }
    info!("gateway shut down");
    Ok(())
}

/// Completes on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received ctrl+c, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

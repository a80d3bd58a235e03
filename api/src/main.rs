use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use common::context::Context;
use common::logging;
use common::signal;
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;
use tokio::select;
use tokio::signal::unix::SignalKind;
use tokio::time;

use crate::config::{AppConfig, ContentBackend};
use crate::content::{ContentSource, FsSource, PgSource, SiteContent};

mod api;
mod config;
mod content;
mod database;
mod global;


#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::parse()?;

    logging::init(&config.logging.level, config.logging.mode)?;

    tracing::debug!("config: {:#?}", config);

    let content: Box<dyn ContentSource> = match config.content.backend {
        ContentBackend::Filesystem => Box::new(FsSource::new(&config.content.data_dir)),
        ContentBackend::Postgres => {
            let db = Arc::new(
                sqlx::PgPool::connect_with(
                    PgConnectOptions::from_str(&config.database.uri)?
                        .disable_statement_logging()
                        .to_owned(),
                )
                .await?,
            );

            Box::new(PgSource::new(db))
        }
    };

    let site = SiteContent::load(&config.content.data_dir).await;

    let (ctx, handler) = Context::new();

    let global = Arc::new(global::GlobalState::new(config, content, site, ctx));

    tracing::info!("{} started", global.config.name);

    let api_future = tokio::spawn(api::run(global.clone()));

    let mut signal_handler = signal::SignalHandler::new()
        .with_signal(SignalKind::interrupt())
        .with_signal(SignalKind::terminate());

    select! {
        r = api_future => tracing::error!("api stopped unexpectedly: {:?}", r),
        _ = signal_handler.recv() => tracing::info!("shutting down"),
    }

    // We cannot have a context in scope when we cancel the handler,
    // otherwise it will deadlock.
    drop(global);

    tracing::info!("waiting for tasks to finish");

    select! {
        _ = time::sleep(Duration::from_secs(60)) => tracing::warn!("force shutting down"),
        _ = signal_handler.recv() => tracing::warn!("force shutting down"),
        _ = handler.cancel() => tracing::info!("shutdown complete"),
    }

    Ok(())
}

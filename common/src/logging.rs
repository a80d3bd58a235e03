use std::str::FromStr;

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter};

type ReloadHandle = Box<dyn Fn(&str) -> Result<(), LoggingError> + Sync + Send>;

static RELOAD_HANDLE: OnceCell<ReloadHandle> = OnceCell::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Default,
    Json,
    Pretty,
    Compact,
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log level: {0}")]
    InvalidLevel(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to init logger: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
    #[error("failed to reload logger: {0}")]
    Reload(#[from] tracing_subscriber::reload::Error),
}

/// Installs the global subscriber. Calling it again only reloads the level
/// filter, the mode of the first call sticks.
pub fn init(level: &str, mode: Mode) -> Result<(), LoggingError> {
    let reload = RELOAD_HANDLE.get_or_try_init(|| {
        let (filter, handle) = reload::Layer::new(EnvFilter::from_str(level)?);

        let registry = tracing_subscriber::registry().with(filter);
        let layer = fmt::layer().with_file(true).with_line_number(true);

        match mode {
            Mode::Default => registry.with(layer).try_init()?,
            Mode::Json => registry.with(layer.json()).try_init()?,
            Mode::Pretty => registry.with(layer.pretty()).try_init()?,
            Mode::Compact => registry.with(layer.compact()).try_init()?,
        }

        Ok::<_, LoggingError>(Box::new(move |level: &str| {
            handle.reload(EnvFilter::from_str(level)?)?;
            Ok(())
        }) as ReloadHandle)
    })?;

    reload(level)?;

    Ok(())
}

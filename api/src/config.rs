use std::net::SocketAddr;

use anyhow::Result;
use common::logging;

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Path to the certificate chain, PEM encoded.
    pub cert: String,
    /// Path to the private key, PEM encoded.
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter, eg. `info` or `crc_api=debug,info`.
    pub level: String,
    pub mode: logging::Mode,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            mode: logging::Mode::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub bind_address: SocketAddr,
    /// Serve HTTPS when set.
    pub tls: Option<TlsConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "[::]:4000".parse().expect("failed to parse bind address"),
            tls: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres connection string, used when the content backend is
    /// `postgres`.
    pub uri: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "postgres://root@localhost:5432/crc".to_owned(),
        }
    }
}

/// Which backend serves games, runners, runs, achievements and teams.
/// Posts and config files always come from the filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentBackend {
    #[default]
    Filesystem,
    Postgres,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    pub backend: ContentBackend,
    /// Root of the markdown content tree.
    pub data_dir: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            backend: ContentBackend::Filesystem,
            data_dir: "data".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base URL of the OAuth provider's auth API.
    pub provider_url: String,
    /// API key sent with provider requests.
    pub provider_key: String,
    /// Shared secret the provider signs access tokens with.
    pub jwt_secret: String,
    /// Expected `iss` claim on access tokens.
    pub jwt_issuer: String,
    pub access_cookie: String,
    pub refresh_cookie: String,
    /// Access cookie lifetime in seconds.
    pub access_max_age: u64,
    /// Refresh cookie lifetime in seconds.
    pub refresh_max_age: u64,
    /// Where stray OAuth codes landing on the site root get forwarded.
    pub callback_path: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider_url: "http://localhost:9999".to_owned(),
            provider_key: String::new(),
            jwt_secret: "crc".to_owned(),
            jwt_issuer: "crc".to_owned(),
            access_cookie: "crc-access-token".to_owned(),
            refresh_cookie: "crc-refresh-token".to_owned(),
            access_max_age: 60 * 60,
            refresh_max_age: 60 * 60 * 24 * 30,
            callback_path: "/v1/auth/callback".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Config file used, none if none was found.
    pub config_file: Option<String>,

    /// Name of this instance.
    pub name: String,

    /// Public origin of the site, used for feed and sitemap links.
    pub site_url: String,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// HTTP server configuration.
    pub api: ApiConfig,

    /// Database configuration.
    pub database: DatabaseConfig,

    /// Content source configuration.
    pub content: ContentConfig,

    /// Auth session bridge configuration.
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: Some("config".to_owned()),
            name: "crc-api".to_owned(),
            site_url: "https://www.challengerun.net".to_owned(),
            logging: Default::default(),
            api: Default::default(),
            database: Default::default(),
            content: Default::default(),
            auth: Default::default(),
        }
    }
}

impl AppConfig {
    /// Layers the defaults, an optional config file and `CRC_` prefixed
    /// environment variables, last one wins. `CRC_CONFIG_FILE` moves
    /// the config file somewhere else.
    pub fn parse() -> Result<Self> {
        let file = std::env::var("CRC_CONFIG_FILE")
            .ok()
            .or_else(|| Self::default().config_file);

        let mut builder = config::Config::builder();

        if let Some(file) = &file {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let mut parsed: Self = builder
            .add_source(config::Environment::with_prefix("CRC").separator("__"))
            .build()?
            .try_deserialize()?;

        parsed.config_file = file;

        Ok(parsed)
    }
}

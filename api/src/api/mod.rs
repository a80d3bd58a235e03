use std::io::{BufReader, Cursor};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use common::http::RouteError;
use common::make_response;
use hyper::server::conn::Http;
use hyper::{Body, Request, Response, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::select;
use tokio_rustls::TlsAcceptor;

use crate::global::GlobalState;

pub mod auth;
pub mod error;
pub mod ext;
pub mod feed;
pub mod jwt;
pub mod middleware;
pub mod request_context;
pub mod sitemap;
pub mod v1;

pub fn routes(global: &Arc<GlobalState>) -> Router<Body, RouteError<error::ApiError>> {
    let weak = Arc::downgrade(global);

    Router::builder()
        .data(weak)
        .middleware(middleware::response_headers::pre_flight_middleware(global))
        .middleware(middleware::cors::cors_middleware(global))
        .middleware(middleware::auth::auth_middleware(global))
        .middleware(middleware::response_headers::post_flight_middleware(global))
        .get("/feed.xml", feed::serve)
        .get("/sitemap.xml", sitemap::serve)
        .scope("/v1", v1::routes(global))
        .any(not_found)
        .err_handler_with_info(common::http::error_handler::<error::ApiError>)
        .build()
        .expect("failed to build router")
}

async fn not_found(_: Request<Body>) -> error::Result<Response<Body>> {
    Ok(make_response!(
        StatusCode::NOT_FOUND,
        json!({ "message": "Not Found", "success": false })
    ))
}

pub async fn run(global: Arc<GlobalState>) -> Result<()> {
    let config = &global.config.api;

    tracing::info!(
        "listening on http{}://{}",
        if config.tls.is_some() { "s" } else { "" },
        config.bind_address
    );

    let tls_acceptor = if let Some(tls) = &config.tls {
        let cert = tokio::fs::read(&tls.cert).await?;
        let key = tokio::fs::read(&tls.key).await?;

        let key = rustls_pemfile::pkcs8_private_keys(&mut BufReader::new(Cursor::new(key)))
            .next()
            .ok_or_else(|| anyhow!("no private key found"))??;

        let certs = rustls_pemfile::certs(&mut BufReader::new(Cursor::new(cert))).collect::<Result<Vec<_>, _>>()?;

        Some(Arc::new(TlsAcceptor::from(Arc::new(
            rustls::ServerConfig::builder()
                .with_no_client_auth()
                .with_single_cert(certs, key.into())?,
        ))))
    } else {
        None
    };

    let listener = TcpListener::bind(config.bind_address).await?;

    let service_builder =
        RequestServiceBuilder::new(routes(&global)).map_err(|err| anyhow!("failed to build service: {}", err))?;

    loop {
        select! {
            _ = global.ctx.done() => {
                return Ok(());
            }
            accepted = listener.accept() => {
                let (socket, addr) = accepted?;

                let service = service_builder.build(addr);
                let tls_acceptor = tls_acceptor.clone();
                let global = global.clone();

                tokio::spawn(async move {
                    let serve = async {
                        match tls_acceptor {
                            Some(acceptor) => {
                                let socket = tokio::time::timeout(Duration::from_secs(5), acceptor.accept(socket))
                                    .await
                                    .map_err(|_| anyhow!("tls handshake timed out"))??;

                                Http::new().serve_connection(socket, service).with_upgrades().await?;
                            }
                            None => {
                                Http::new().serve_connection(socket, service).with_upgrades().await?;
                            }
                        }

                        Ok::<_, anyhow::Error>(())
                    };

                    select! {
                        result = serve => {
                            if let Err(err) = result {
                                tracing::debug!(addr = %addr, error = %err, "connection closed with error");
                            }
                        }
                        _ = global.ctx.done() => {}
                    }
                });
            }
        }
    }
}

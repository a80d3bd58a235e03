use std::sync::Arc;

use hyper::header::{HeaderValue, LOCATION, SET_COOKIE};
use hyper::{Body, Response, StatusCode};
use routerify::prelude::RequestExt as _;
use routerify::Middleware;

use crate::api::auth::CookieJar;
use crate::api::error::ApiError;
use crate::api::ext::RequestExt as _;
use crate::api::middleware::response_headers::RequestExt as _;
use crate::api::request_context::RequestContext;
use crate::global::GlobalState;

pub fn auth_middleware(_: &Arc<GlobalState>) -> Middleware<Body, common::http::RouteError<ApiError>> {
    Middleware::pre(|req| async move {
        let context = RequestContext::default();
        req.set_context(context.clone());

        let global = req.get_global()?;
        let jar = CookieJar::parse(req.headers());

        // Safety net for OAuth providers configured without an explicit
        // redirect URL: a signed-out hit on the site root that carries a
        // code gets bounced to the callback with the query intact.
        if req.uri().path() == "/" && !global.session_bridge.has_session_cookies(&jar) {
            if let Some(query) = req.uri().query() {
                if query.split('&').any(|pair| pair.starts_with("code=")) {
                    let location = format!("{}?{}", global.config.auth.callback_path, query);

                    let response = Response::builder()
                        .status(StatusCode::FOUND)
                        .header(LOCATION, location)
                        .body(Body::empty())
                        .expect("failed to build response");

                    return Err(response.into());
                }
            }
        }

        // No cookies at all means an anonymous or prerender request.
        // Those never touch the auth provider.
        if jar.is_empty() {
            return Ok(req);
        }

        let (session, cookies) = global.session_bridge.restore(&jar).await;

        for cookie in cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie.to_header_value()) {
                req.set_response_header(SET_COOKIE, value);
            }
        }

        if let Some(session) = session {
            context.set_session(session).await;
        }

        Ok(req)
    })
}

use std::sync::Arc;

use common::http::ext::ResultExt;
use common::http::RouteError;
use common::make_response;
use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;
use routerify::Router;
use serde_json::json;

use crate::api::auth::TokenPair;
use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::api::request_context::RequestContext;
use crate::global::GlobalState;

pub fn routes(_: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder()
        .post("/callback", callback)
        .post("/signout", signout)
        .build()
        .expect("failed to build router")
}

/// The session attached to this request, if the middleware restored
/// one. Never exposes the raw tokens.
pub async fn session(req: Request<Body>) -> Result<Response<Body>> {
    let session = match req.context::<RequestContext>() {
        Some(context) => context.session().await,
        None => None,
    };

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "session": session.map(|s| json!({
                "user_id": s.user_id,
                "email": s.email,
                "expires_at": s.expires_at,
            })),
        })
    ))
}

#[derive(serde::Deserialize)]
struct CallbackPayload {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// Completes a sign in: the client hands over the token pair it got
/// from the provider and receives it back as session cookies. The
/// access token must verify before anything is set.
async fn callback(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let body = hyper::body::to_bytes(req.into_body())
        .await
        .map_err_route((StatusCode::BAD_REQUEST, "Invalid request"))?;
    let payload: CallbackPayload =
        serde_json::from_slice(&body).map_err_route((StatusCode::BAD_REQUEST, "Invalid request"))?;

    let (Some(access_token), Some(refresh_token)) = (payload.access_token, payload.refresh_token) else {
        return Err((StatusCode::BAD_REQUEST, "Missing tokens").into());
    };

    if global.session_bridge.verify(&access_token).is_none() {
        return Err((StatusCode::BAD_REQUEST, "Invalid tokens").into());
    }

    let pair = TokenPair {
        access_token,
        refresh_token,
    };

    let mut response = make_response!(StatusCode::OK, json!({ "ok": true }));

    for cookie in global.session_bridge.session_cookies(&pair) {
        let value = HeaderValue::from_str(&cookie.to_header_value())
            .map_ignore_err_route((StatusCode::BAD_REQUEST, "Invalid tokens"))?;
        response.headers_mut().append(SET_COOKIE, value);
    }

    Ok(response)
}

/// Clears the session cookies. Always succeeds, signed in or not.
async fn signout(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let mut response = make_response!(StatusCode::OK, json!({ "ok": true }));

    for cookie in global.session_bridge.signout_cookies() {
        if let Ok(value) = HeaderValue::from_str(&cookie.to_header_value()) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    Ok(response)
}

use std::sync::Arc;

use common::http::ext::ResultExt;
use common::http::RouteError;
use common::make_response;
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;
use routerify::{Middleware, Router};
use serde_json::json;

use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::api::request_context::RequestContext;
use crate::global::GlobalState;

/// Moderation endpoints. Everything in here requires a session whose
/// user is linked to a runner profile with the admin flag.
pub fn routes(_: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder()
        .middleware(Middleware::pre(require_admin))
        .get("/games", games)
        .get("/runs", pending_runs)
        .get("/achievements", pending_achievements)
        .build()
        .expect("failed to build router")
}

/// 401 without a session, 403 with a session that is not an admin.
async fn require_admin(req: Request<Body>) -> Result<Request<Body>> {
    let global = req.get_global()?;

    let session = match req.context::<RequestContext>() {
        Some(context) => context.session().await,
        None => None,
    };
    let Some(session) = session else {
        return Err((StatusCode::UNAUTHORIZED, "Not signed in").into());
    };

    let runner = global
        .content
        .runner_by_user_id(session.user_id)
        .await
        .map_err_route("failed to fetch runner profile")?;

    if !runner.map(|r| r.is_admin()).unwrap_or(false) {
        return Err((StatusCode::FORBIDDEN, "Admin access required").into());
    }

    Ok(req)
}

/// Every game including hidden ones, for the moderation dashboard.
async fn games(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    Ok(make_response!(
        StatusCode::OK,
        json!({ "games": global.content.all_games().await })
    ))
}

async fn pending_runs(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    Ok(make_response!(
        StatusCode::OK,
        json!({ "runs": global.content.pending_runs().await })
    ))
}

async fn pending_achievements(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    Ok(make_response!(
        StatusCode::OK,
        json!({ "achievements": global.content.pending_achievements().await })
    ))
}

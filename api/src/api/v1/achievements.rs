use std::sync::Arc;

use common::http::ext::ResultExt;
use common::http::RouteError;
use common::make_response;
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;
use routerify::Router;
use serde_json::json;

use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::api::request_context::RequestContext;
use crate::database::NewAchievement;
use crate::global::GlobalState;

pub fn routes(_: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder().post("/", submit).build().expect("failed to build router")
}

/// Accepts an achievement claim from a signed in runner. The slug must
/// name one of the game's community achievement definitions. A repeat
/// claim on the same triple is a no-op, reported as `inserted: false`.
async fn submit(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let session = match req.context::<RequestContext>() {
        Some(context) => context.session().await,
        None => None,
    };
    let Some(session) = session else {
        return Err((StatusCode::UNAUTHORIZED, "Not signed in").into());
    };

    let profile = global
        .content
        .runner_by_user_id(session.user_id)
        .await
        .map_err_route("failed to fetch runner profile")?;
    let Some(profile) = profile else {
        return Err((StatusCode::FORBIDDEN, "No runner profile").into());
    };

    let body = hyper::body::to_bytes(req.into_body())
        .await
        .map_err_route((StatusCode::BAD_REQUEST, "Invalid request"))?;
    let mut submission: NewAchievement =
        serde_json::from_slice(&body).map_err_route((StatusCode::BAD_REQUEST, "Invalid request"))?;

    submission.runner_id = profile.runner_id.clone();

    let Some(game) = global
        .content
        .game(&submission.game_id)
        .await
        .map_err_route("failed to fetch game")?
    else {
        return Err((StatusCode::BAD_REQUEST, "Unknown game").into());
    };

    let defined = game
        .community_achievements
        .as_ref()
        .map(|defs| defs.iter().any(|def| def.slug == submission.achievement_slug))
        .unwrap_or(false);
    if !defined {
        return Err((StatusCode::BAD_REQUEST, "Unknown achievement").into());
    }

    let inserted = global
        .content
        .submit_achievement(submission)
        .await
        .map_err_route("failed to store submission")?;

    Ok(make_response!(StatusCode::OK, json!({ "ok": true, "inserted": inserted })))
}

use std::sync::Arc;

use common::http::RouteError;
use common::make_response;
use hyper::{Body, Request, Response, StatusCode};
use routerify::Router;
use serde_json::json;

use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::global::GlobalState;

pub fn routes(_: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder().get("/", index).build().expect("failed to build router")
}

/// The client-side search index: one entry per active game and listed
/// runner. Matching happens in the browser, this just serves the corpus.
async fn index(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let (games, runners) = tokio::join!(global.content.active_games(), global.content.runners());

    let mut entries = Vec::new();

    for game in &games {
        entries.push(json!({
            "type": "game",
            "id": game.game_id,
            "name": game.game_name,
            "aliases": game.game_name_aliases,
            "genres": game.genres,
            "url": format!("/games/{}", game.game_id),
        }));
    }

    for runner in runners.iter().filter(|r| r.is_listed()) {
        entries.push(json!({
            "type": "runner",
            "id": runner.runner_id,
            "name": runner.display(),
            "url": format!("/runners/{}", runner.runner_id),
        }));
    }

    Ok(make_response!(StatusCode::OK, json!({ "entries": entries })))
}

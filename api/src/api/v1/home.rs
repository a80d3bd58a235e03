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
    Router::builder().get("/", home).build().expect("failed to build router")
}

/// Everything the landing page shows: active games, the latest approved
/// runs, the newest posts, a few teams and the site totals.
async fn home(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let (games, recent_runs, teams, counts) = tokio::join!(
        global.content.active_games(),
        global.content.recent_runs(10),
        global.content.teams(),
        global.content.counts(),
    );

    let posts = global.site.posts();

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "games": games,
            "recent_runs": recent_runs,
            "posts": &posts[..posts.len().min(5)],
            "teams": &teams[..teams.len().min(4)],
            "stats": {
                "game_count": counts.game_count,
                "runner_count": counts.runner_count,
                "run_count": counts.run_count,
                "achievement_count": counts.achievement_count,
                "team_count": counts.team_count,
                "post_count": posts.len(),
            },
        })
    ))
}

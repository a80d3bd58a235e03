use std::sync::Arc;

use common::http::ext::{OptionExt, ResultExt};
use common::http::RouteError;
use common::make_response;
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;
use routerify::Router;
use serde_json::json;

use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::database::Run;
use crate::global::GlobalState;

pub fn routes(_: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder()
        .get("/", list)
        .get("/:runner_id", get)
        .build()
        .expect("failed to build router")
}

/// The runners index: listed profiles with their approved run counts.
async fn list(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let runners: Vec<_> = global
        .content
        .runners()
        .await
        .into_iter()
        .filter(|r| r.is_listed())
        .collect();
    let counts = futures::future::join_all(
        runners.iter().map(|r| global.content.run_count_for_runner(&r.runner_id)),
    )
    .await;

    let mut payload = Vec::with_capacity(runners.len());
    for (runner, run_count) in runners.iter().zip(counts) {
        let mut value = serde_json::to_value(runner).map_err_route("failed to serialize runner")?;
        if let Some(runner) = value.as_object_mut() {
            runner.insert("run_count".to_owned(), run_count.into());
        }

        payload.push(value);
    }

    Ok(make_response!(StatusCode::OK, json!({ "runners": payload })))
}

/// One runner's profile with their runs grouped by game, most recently
/// completed first within each group.
async fn get(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;
    let runner_id = req
        .param("runner_id")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing runner id"))?
        .clone();

    let Some(runner) = global
        .content
        .runner(&runner_id)
        .await
        .map_err_route("failed to fetch runner")?
    else {
        return Err((StatusCode::NOT_FOUND, "Runner not found").into());
    };

    let (runs, achievements, games) = tokio::join!(
        global.content.runs_for_runner(&runner_id),
        global.content.achievements_for_runner(&runner_id),
        global.content.games(),
    );

    // Group by game in order of each game's first appearance. Runs for
    // games that no longer exist are dropped from the groups.
    let mut groups: Vec<(String, Vec<&Run>)> = Vec::new();
    for run in &runs {
        match groups.iter_mut().find(|(game_id, _)| game_id == &run.game_id) {
            Some((_, group)) => group.push(run),
            None => {
                if games.iter().any(|g| g.game_id == run.game_id) {
                    groups.push((run.game_id.clone(), vec![run]));
                }
            }
        }
    }

    let game_groups: Vec<_> = groups
        .into_iter()
        .filter_map(|(game_id, group)| {
            games
                .iter()
                .find(|g| g.game_id == game_id)
                .map(|game| json!({ "game": game, "runs": group }))
        })
        .collect();

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "runner": runner,
            "runs": runs,
            "achievements": achievements,
            "game_groups": game_groups,
        })
    ))
}

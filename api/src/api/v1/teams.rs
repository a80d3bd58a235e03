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
use crate::database::Game;
use crate::global::GlobalState;

pub fn routes(_: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder()
        .get("/", list)
        .get("/:team_id", get)
        .build()
        .expect("failed to build router")
}

async fn list(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let teams = global.content.teams().await;

    Ok(make_response!(StatusCode::OK, json!({ "teams": teams })))
}

/// One team with its games and roster resolved against the content
/// source. Members without a runner profile still render from the
/// denormalized roster data.
async fn get(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;
    let team_id = req
        .param("team_id")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing team id"))?
        .clone();

    let Some(team) = global.content.team(&team_id).await.map_err_route("failed to fetch team")? else {
        return Err((StatusCode::NOT_FOUND, "Team not found").into());
    };

    let games = global.content.games().await;
    let team_games: Vec<&Game> = team
        .games
        .iter()
        .flatten()
        .filter_map(|id| games.iter().find(|g| &g.game_id == id))
        .collect();

    let members: Vec<serde_json::Value> = match &team.members {
        Some(members) => {
            let profiles =
                futures::future::join_all(members.iter().map(|m| global.content.runner(&m.runner_id))).await;

            members
                .iter()
                .zip(profiles)
                .map(|(member, profile)| {
                    let profile = profile.ok().flatten();

                    let name = if !member.name.is_empty() {
                        member.name.clone()
                    } else if let Some(profile) = &profile {
                        profile.display().to_owned()
                    } else {
                        member.runner_id.clone()
                    };

                    json!({
                        "runner_id": member.runner_id,
                        "name": name,
                        "role": member.role,
                        "avatar": profile.as_ref().and_then(|p| p.avatar.clone()),
                        "has_profile": profile.is_some(),
                    })
                })
                .collect()
        }
        None => Vec::new(),
    };

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "team": team,
            "games": team_games,
            "members": members,
        })
    ))
}

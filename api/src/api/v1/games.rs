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
        .get("/:game_id", get)
        .get("/:game_id/categories", categories)
        .get("/:game_id/history", history)
        .get("/:game_id/runs/:tier/:category", category_runs)
        .build()
        .expect("failed to build router")
}

/// The games index: active games with their approved run counts, plus
/// the platform and genre filter options.
async fn list(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    let games = global.content.active_games().await;
    let counts =
        futures::future::join_all(games.iter().map(|g| global.content.run_count_for_game(&g.game_id))).await;

    let mut payload = Vec::with_capacity(games.len());
    for (game, run_count) in games.iter().zip(counts) {
        let mut value = serde_json::to_value(game).map_err_route("failed to serialize game")?;
        if let Some(game) = value.as_object_mut() {
            game.insert("run_count".to_owned(), run_count.into());
        }

        payload.push(value);
    }

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "games": payload,
            "platforms": global.site.platforms(),
            "genres": global.site.genres(),
        })
    ))
}

/// One game with everything its page needs in a single round trip.
async fn get(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;
    let game_id = req
        .param("game_id")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing game id"))?
        .clone();

    let Some(game) = global.content.game(&game_id).await.map_err_route("failed to fetch game")? else {
        return Err((StatusCode::NOT_FOUND, "Game not found").into());
    };

    let (runs, all_games, achievements, runners) = tokio::join!(
        global.content.runs_for_game(&game_id),
        global.content.games(),
        global.content.achievements_for_game(&game_id),
        global.content.runners(),
    );

    let categories = game.all_categories();

    let base_game = game
        .base_game
        .as_ref()
        .and_then(|id| all_games.iter().find(|g| &g.game_id == id));
    let modded_versions: Vec<&Game> = all_games
        .iter()
        .filter(|g| g.is_modded() && g.base_game.as_deref() == Some(game_id.as_str()))
        .collect();

    let mut run_count_by_category = serde_json::Map::new();
    for category in &categories {
        let count = runs.iter().filter(|r| r.category_slug == category.slug).count();
        run_count_by_category.insert(category.slug.clone(), count.into());
    }

    // Enough of each runner to render leaderboard rows without loading
    // full profiles.
    let mut runner_map = serde_json::Map::new();
    for runner in &runners {
        runner_map.insert(
            runner.runner_id.clone(),
            json!({
                "runner_name": runner.runner_name,
                "display_name": runner.display_name,
                "avatar": runner.avatar,
            }),
        );
    }

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "game": game,
            "categories": categories,
            "runs": runs,
            "achievements": achievements,
            "runner_map": runner_map,
            "run_count_by_category": run_count_by_category,
            "total_run_count": runs.len(),
            "base_game": base_game,
            "modded_versions": modded_versions,
            "default_general_rules": global.site.default_general_rules(),
        })
    ))
}

async fn categories(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;
    let game_id = req
        .param("game_id")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing game id"))?
        .clone();

    let Some(game) = global.content.game(&game_id).await.map_err_route("failed to fetch game")? else {
        return Err((StatusCode::NOT_FOUND, "Game not found").into());
    };

    Ok(make_response!(StatusCode::OK, json!({ "categories": game.all_categories() })))
}

/// The game's moderation changelog. Games without a history file get an
/// empty list, unknown games a 404.
async fn history(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;
    let game_id = req
        .param("game_id")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing game id"))?
        .clone();

    if global
        .content
        .game(&game_id)
        .await
        .map_err_route("failed to fetch game")?
        .is_none()
    {
        return Err((StatusCode::NOT_FOUND, "Game not found").into());
    }

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "game_id": game_id,
            "history": global.site.history_for(&game_id),
        })
    ))
}

/// The leaderboard for one category. The tier segment must name one of
/// the three tiers and the slug must resolve inside it.
async fn category_runs(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;
    let game_id = req
        .param("game_id")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing game id"))?
        .clone();
    let tier = req
        .param("tier")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing tier"))?
        .clone();
    let category_slug = req
        .param("category")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing category"))?
        .clone();

    let Some(game) = global.content.game(&game_id).await.map_err_route("failed to fetch game")? else {
        return Err((StatusCode::NOT_FOUND, "Game not found").into());
    };

    let Some(category) = game.find_category(&tier, &category_slug) else {
        return Err((StatusCode::NOT_FOUND, "Category not found").into());
    };

    let runs = global.content.runs_for_category(&game_id, &category_slug).await;

    Ok(make_response!(
        StatusCode::OK,
        json!({
            "game": game,
            "category": category,
            "runs": runs,
        })
    ))
}

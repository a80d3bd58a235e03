use std::sync::Arc;

use common::http::RouteError;
use hyper::Body;
use routerify::Router;

use super::error::ApiError;
use crate::global::GlobalState;

pub mod achievements;
pub mod admin;
pub mod auth;
pub mod games;
pub mod health;
pub mod home;
pub mod posts;
pub mod runners;
pub mod runs;
pub mod search;
pub mod teams;

pub fn routes(global: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder()
        .get("/session", auth::session)
        .scope("/health", health::routes(global))
        .scope("/home", home::routes(global))
        .scope("/auth", auth::routes(global))
        .scope("/games", games::routes(global))
        .scope("/runners", runners::routes(global))
        .scope("/teams", teams::routes(global))
        .scope("/search", search::routes(global))
        .scope("/posts", posts::routes(global))
        .scope("/runs", runs::routes(global))
        .scope("/achievements", achievements::routes(global))
        .scope("/admin", admin::routes(global))
        .build()
        .expect("failed to build router")
}

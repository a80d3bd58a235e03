use std::sync::Arc;

use common::http::ext::OptionExt;
use common::http::RouteError;
use common::make_response;
use hyper::{Body, Request, Response, StatusCode};
use routerify::prelude::RequestExt as _;
use routerify::Router;
use serde_json::json;

use crate::api::error::{ApiError, Result};
use crate::api::ext::RequestExt as _;
use crate::global::GlobalState;

pub fn routes(_: &Arc<GlobalState>) -> Router<Body, RouteError<ApiError>> {
    Router::builder()
        .get("/", list)
        .get("/:slug", get)
        .build()
        .expect("failed to build router")
}

async fn list(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;

    Ok(make_response!(StatusCode::OK, json!({ "posts": global.site.posts() })))
}

async fn get(req: Request<Body>) -> Result<Response<Body>> {
    let global = req.get_global()?;
    let slug = req
        .param("slug")
        .map_err_route((StatusCode::BAD_REQUEST, "Missing slug"))?
        .clone();

    let Some(post) = global.site.post_by_slug(&slug) else {
        return Err((StatusCode::NOT_FOUND, "Post not found").into());
    };

    Ok(make_response!(StatusCode::OK, json!({ "post": post })))
}

use common::http::RouteError;

use crate::content::ContentError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("failed to parse http body: {0}")]
    ParseHttpBody(#[from] hyper::Error),
    #[error("failed to parse request: {0}")]
    ParseRequest(#[from] serde_json::Error),
    #[error("content query failed: {0}")]
    Content(#[from] ContentError),
}

use std::sync::{Arc, Weak};

use common::http::ext::OptionExt;
use hyper::{Body, Request, StatusCode};
use routerify::prelude::RequestExt as _;

use super::error::Result;
use crate::global::GlobalState;

pub trait RequestExt {
    /// The shared state, valid while the server is running. Erroring
    /// here means we are mid-shutdown.
    fn get_global(&self) -> Result<Arc<GlobalState>>;
}

impl RequestExt for Request<Body> {
    fn get_global(&self) -> Result<Arc<GlobalState>> {
        self.data::<Weak<GlobalState>>()
            .expect("global state not set")
            .upgrade()
            .map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to upgrade global state"))
    }
}

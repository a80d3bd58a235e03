use std::sync::{Arc, Mutex};

use hyper::header::{HeaderName, HeaderValue};
use hyper::{Body, HeaderMap, Request};
use routerify::prelude::RequestExt as _;
use routerify::Middleware;

use crate::api::error::ApiError;
use crate::global::GlobalState;

/// Headers queued during request handling, copied onto whatever
/// response goes out, including error responses.
#[derive(Default, Clone)]
pub struct ResponseHeaders(Arc<Mutex<HeaderMap>>);

pub fn pre_flight_middleware(_: &Arc<GlobalState>) -> Middleware<Body, common::http::RouteError<ApiError>> {
    Middleware::pre(|req| async move {
        req.set_context(ResponseHeaders::default());

        Ok(req)
    })
}

pub fn post_flight_middleware(_: &Arc<GlobalState>) -> Middleware<Body, common::http::RouteError<ApiError>> {
    Middleware::post_with_info(|mut resp, info| async move {
        if let Some(headers) = info.context::<ResponseHeaders>() {
            let headers = headers.0.lock().expect("failed to lock headers");

            // Append rather than insert, a rotated session queues two
            // Set-Cookie headers.
            for (key, value) in headers.iter() {
                resp.headers_mut().append(key, value.clone());
            }
        }

        Ok(resp)
    })
}

pub trait RequestExt {
    fn set_response_header(&self, key: HeaderName, value: HeaderValue);
}

impl RequestExt for Request<Body> {
    fn set_response_header(&self, key: HeaderName, value: HeaderValue) {
        let Some(headers) = self.context::<ResponseHeaders>() else {
            return;
        };

        let mut headers = headers.0.lock().expect("failed to lock headers");
        headers.append(key, value);
    }
}

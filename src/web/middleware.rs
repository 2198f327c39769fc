use axum::body::Body;
use axum::http::Request;
use axum::http::header::CACHE_CONTROL;
use axum::middleware::Next;
use axum::response::Response;

use super::prelude::*;
use crate::storage::cache_control_for_key;

/// Stamps served objects with the Cache-Control their key prefix calls for.
pub(crate) async fn object_cache_headers(request: Request<Body>, next: Next) -> Response {
    let cache_control = cache_control_for_key(request.uri().path());
    let mut response = next.run(request).await;
    if response.status().is_success() {
        response
            .headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static(cache_control));
    }
    response
}

//! Handler side of the params protocol for axum applications.

use axum::Json;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use prerender_kit_core::protocol::{self, PARAMS_HEADER, PARAMS_HEADER_VALUE, ParamsPayload};
use prerender_kit_generator::ParamsProvider;
use std::sync::Arc;
use tracing::error;

/// Answer a params probe with the provider's parameter sets, or run the
/// handler normally when the request is not marked.
///
/// Wire it with `axum::middleware::from_fn`:
///
/// ```ignore
/// let provider: Arc<dyn ParamsProvider> = Arc::new(all_post_ids);
/// get(show_post).route_layer(middleware::from_fn(move |req: Request, next: Next| {
///     params_middleware(provider.clone(), req, next)
/// }))
/// ```
pub async fn params_middleware(
    provider: Arc<dyn ParamsProvider>,
    request: Request,
    next: Next,
) -> Response {
    let marked = protocol::is_marker(
        request
            .headers()
            .get(PARAMS_HEADER)
            .and_then(|value| value.to_str().ok()),
    );
    if !marked {
        return next.run(request).await;
    }

    match provider.params().await {
        Ok(sets) => params_response(sets),
        Err(e) => {
            error!(path = %request.uri().path(), error = %e, "params provider failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(PARAMS_HEADER, PARAMS_HEADER_VALUE)],
                e.to_string(),
            )
                .into_response()
        }
    }
}

/// `{ "params": [..] }` with the params header echoed
pub fn params_response(payload: impl Into<ParamsPayload>) -> Response {
    (
        [(PARAMS_HEADER, PARAMS_HEADER_VALUE)],
        Json(payload.into()),
    )
        .into_response()
}

//! In-process applications built on axum.
//!
//! [`SsgRouter`] registers routes on an axum [`Router`] and records each one in
//! a [`RouteTable`], so dynamic routes carry their params provider from the
//! moment they are registered. [`RouterApp`] serves requests through the router
//! without opening a socket.

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::handler::Handler;
use axum::http::Request;
use axum::middleware;
use axum::routing::{MethodRouter, get};
use prerender_kit_core::template::{self, encode_path};
use prerender_kit_core::{Error, Method, Result, Route};
use prerender_kit_generator::routes::RouteTableBuilder;
use prerender_kit_generator::{
    App, AppResponse, FetchRequest, ParamSource, ParamsProvider, RouteTable,
};
use std::sync::Arc;
use tower::ServiceExt;

use crate::params::params_middleware;

/// Serves requests by calling an axum router directly
#[derive(Clone)]
pub struct RouterApp {
    router: Router,
}

impl RouterApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

#[async_trait]
impl App for RouterApp {
    async fn fetch(&self, request: FetchRequest) -> Result<AppResponse> {
        let mut builder = Request::builder().uri(encode_path(&request.path));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let http_request = builder
            .body(Body::empty())
            .map_err(|e| Error::Http(format!("Invalid request for '{}': {}", request.path, e)))?;

        let response = match self.router.clone().oneshot(http_request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .map_err(|e| Error::Http(format!("Failed to read body of '{}': {}", request.path, e)))?
            .to_vec();

        Ok(AppResponse {
            status,
            headers,
            body,
        })
    }
}

/// axum router builder that records its route table
pub struct SsgRouter<S = ()> {
    router: Router<S>,
    table: RouteTableBuilder,
    routes: Vec<Route>,
    listing_path: Option<String>,
}

impl<S> Default for SsgRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SsgRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            table: RouteTable::builder(),
            routes: Vec::new(),
            listing_path: None,
        }
    }

    /// GET route whose path is already concrete
    pub fn page<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        self.register(Route::get(path), ParamSource::Static, get(handler))
    }

    /// GET route expanded through `provider`. Over HTTP the same provider
    /// answers params probes, so external builds see identical URLs.
    pub fn dynamic<H, T, P>(self, path: &str, provider: P, handler: H) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
        P: ParamsProvider + 'static,
    {
        let provider: Arc<dyn ParamsProvider> = Arc::new(provider);
        let probe_provider = provider.clone();
        let method_router = get(handler).route_layer(middleware::from_fn(
            move |req: axum::extract::Request, next: middleware::Next| {
                params_middleware(probe_provider.clone(), req, next)
            },
        ));
        self.register(Route::get(path), ParamSource::Provider(provider), method_router)
    }

    /// Any other route. It is recorded so the table mirrors the router, but
    /// only concrete GET/ALL routes will ever be pre-rendered from it.
    pub fn route(self, method: Method, path: &str, method_router: MethodRouter<S>) -> Self {
        let source = if template::is_concrete(path) {
            ParamSource::Static
        } else {
            ParamSource::Negotiate
        };
        self.register(Route::new(method, path), source, method_router)
    }

    /// Expose the recorded routes as JSON at `path`
    pub fn with_route_listing(mut self, path: &str) -> Self {
        self.listing_path = Some(path.to_string());
        self
    }

    fn register(mut self, route: Route, source: ParamSource, method_router: MethodRouter<S>) -> Self {
        self.router = self
            .router
            .route(&template::to_axum_path(&route.path), method_router);
        self.routes.push(route.clone());
        self.table = self.table.route(route, source);
        self
    }

    pub fn into_parts(self) -> (Router<S>, RouteTable) {
        let mut router = self.router;
        if let Some(path) = self.listing_path {
            let listing = Arc::new(self.routes);
            router = router.route(
                &path,
                get(move || {
                    let listing = listing.clone();
                    async move { axum::Json(listing.as_ref().clone()) }
                }),
            );
        }
        (router, self.table.build())
    }
}

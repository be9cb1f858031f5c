//! Route table snapshot handed to the enumerator.
//!
//! Each route carries a [`ParamSource`] decided when the route is registered,
//! so enumeration never has to guess whether a handler is dynamic.

use async_trait::async_trait;
use prerender_kit_core::{Method, ParameterSet, Route};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Supplies every parameter set a dynamic route should be expanded to
#[async_trait]
pub trait ParamsProvider: Send + Sync {
    async fn params(&self) -> Result<Vec<ParameterSet>, BoxError>;
}

#[async_trait]
impl<F, Fut> ParamsProvider for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<ParameterSet>, BoxError>> + Send,
{
    async fn params(&self) -> Result<Vec<ParameterSet>, BoxError> {
        (self)().await
    }
}

/// A fixed list of parameter sets
#[derive(Debug, Clone, Default)]
pub struct StaticParams(pub Vec<ParameterSet>);

#[async_trait]
impl ParamsProvider for StaticParams {
    async fn params(&self) -> Result<Vec<ParameterSet>, BoxError> {
        Ok(self.0.clone())
    }
}

/// Where a route's parameter sets come from
#[derive(Clone)]
pub enum ParamSource {
    /// The path is already concrete
    Static,
    /// In-process provider registered alongside the handler
    Provider(Arc<dyn ParamsProvider>),
    /// Ask the running app via the params header
    Negotiate,
}

impl fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamSource::Static => f.write_str("Static"),
            ParamSource::Provider(_) => f.write_str("Provider(..)"),
            ParamSource::Negotiate => f.write_str("Negotiate"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub route: Route,
    pub source: ParamSource,
}

/// Immutable, ordered snapshot of the application's routes
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Routes discovered from an external app; dynamic ones are negotiated
    pub fn negotiated(routes: impl IntoIterator<Item = Route>) -> Self {
        Self {
            entries: routes
                .into_iter()
                .map(|route| RouteEntry {
                    route,
                    source: ParamSource::Negotiate,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Entries eligible for pre-rendering, in registration order
    pub fn prerenderable(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.route.method.is_prerenderable())
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.entries.iter().map(|entry| &entry.route)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    entries: Vec<RouteEntry>,
}

impl RouteTableBuilder {
    pub fn route(mut self, route: Route, source: ParamSource) -> Self {
        self.entries.push(RouteEntry { route, source });
        self
    }

    pub fn static_route(self, method: Method, path: impl Into<String>) -> Self {
        self.route(Route::new(method, path), ParamSource::Static)
    }

    pub fn dynamic_route(
        self,
        method: Method,
        path: impl Into<String>,
        provider: impl ParamsProvider + 'static,
    ) -> Self {
        self.route(
            Route::new(method, path),
            ParamSource::Provider(Arc::new(provider)),
        )
    }

    pub fn negotiated_route(self, method: Method, path: impl Into<String>) -> Self {
        self.route(Route::new(method, path), ParamSource::Negotiate)
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prerender_kit_core::param_set;

    #[tokio::test]
    async fn test_closure_provider() {
        let provider = || async { Ok::<_, BoxError>(vec![param_set([("id", "1")])]) };
        let sets = provider.params().await.unwrap();
        assert_eq!(sets[0]["id"], "1");
    }

    #[test]
    fn test_prerenderable_filters_mutating_methods() {
        let table = RouteTable::builder()
            .static_route(Method::Get, "/")
            .static_route(Method::Post, "/posts")
            .negotiated_route(Method::Delete, "/posts/:id")
            .static_route(Method::All, "/about")
            .build();

        let paths: Vec<&str> = table
            .prerenderable()
            .map(|e| e.route.path.as_str())
            .collect();
        assert_eq!(paths, vec!["/", "/about"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_negotiated_table_keeps_order() {
        let table = RouteTable::negotiated(vec![Route::get("/b"), Route::get("/a")]);
        let paths: Vec<&str> = table.routes().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/b", "/a"]);
        assert!(matches!(table.entries()[0].source, ParamSource::Negotiate));
    }
}

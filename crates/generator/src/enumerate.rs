use prerender_kit_core::protocol::{self, PARAMS_HEADER};
use prerender_kit_core::template;
use prerender_kit_core::{ConcreteUrl, Error, ParameterSet, Result, Route, UrlSet};
use tracing::debug;

use crate::app::{App, FetchRequest};
use crate::routes::{ParamSource, RouteEntry, RouteTable};

/// Resolve the route table into the set of concrete URLs to pre-render.
///
/// Only `GET` and `ALL` routes are considered, in registration order. Parameter
/// sets are expanded in the order they are returned and duplicates collapse.
pub async fn enumerate(table: &RouteTable, app: &dyn App) -> Result<UrlSet> {
    let mut urls = UrlSet::new();

    for entry in table.prerenderable() {
        let route = &entry.route;
        if template::has_wildcard(&route.path) {
            debug!(route = %route, "skipping wildcard route");
            continue;
        }

        for url in expand_entry(entry, app).await? {
            let missing = template::unresolved_params(&url);
            if !missing.is_empty() {
                return Err(Error::UnresolvedParams {
                    route: route.path.clone(),
                    url,
                    missing,
                });
            }
            if !urls.insert(ConcreteUrl::new(url)) {
                debug!(route = %route, "duplicate url collapsed");
            }
        }
    }

    Ok(urls)
}

async fn expand_entry(entry: &RouteEntry, app: &dyn App) -> Result<Vec<String>> {
    let route = &entry.route;
    match &entry.source {
        ParamSource::Static => Ok(vec![route.path.clone()]),
        ParamSource::Provider(provider) => {
            let sets = provider.params().await.map_err(|e| Error::Provider {
                route: route.path.clone(),
                message: e.to_string(),
            })?;
            debug!(route = %route, count = sets.len(), "provider returned params");
            Ok(expand(route, &sets))
        }
        ParamSource::Negotiate => {
            // Paths without tokens are taken as-is; the app is never asked
            if template::param_names(&route.path).is_empty() {
                return Ok(vec![route.path.clone()]);
            }
            match probe(route, app).await? {
                Some(sets) => Ok(expand(route, &sets)),
                None => Ok(vec![route.path.clone()]),
            }
        }
    }
}

/// Ask a route for its parameter sets. `None` means the route ignored the marker.
async fn probe(route: &Route, app: &dyn App) -> Result<Option<Vec<ParameterSet>>> {
    let response = app.fetch(FetchRequest::probe(&route.path)).await?;
    if !protocol::is_marker(response.header(PARAMS_HEADER)) {
        debug!(route = %route, status = response.status, "route did not answer params probe");
        return Ok(None);
    }
    if response.status != 200 {
        return Err(Error::Provider {
            route: route.path.clone(),
            message: format!(
                "status {}: {}",
                response.status,
                String::from_utf8_lossy(&response.body).trim()
            ),
        });
    }

    let sets = protocol::parse_params_payload(&route.path, &response.body)?;
    debug!(route = %route, count = sets.len(), "route answered params probe");
    Ok(Some(sets))
}

fn expand(route: &Route, sets: &[ParameterSet]) -> Vec<String> {
    sets.iter()
        .map(|params| template::substitute(&route.path, params))
        .collect()
}

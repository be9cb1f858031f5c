use async_trait::async_trait;
use prerender_kit_core::template::encode_path;
use prerender_kit_core::{Error, Result, Route};
use prerender_kit_generator::{App, AppResponse, FetchRequest};
use reqwest::redirect;
use std::time::Duration;
use url::Url;

/// An application reached over HTTP at `base_url`
#[derive(Debug, Clone)]
pub struct HttpApp {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpApp {
    pub fn new(mut base_url: Url, request_timeout: Option<Duration>) -> Result<Self> {
        // Joining relative paths must not drop the last base segment
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        // A redirect is not the page itself; it surfaces as a non-200 and is skipped
        let mut builder = reqwest::Client::builder().redirect(redirect::Policy::none());
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL for an application path
    pub fn url_for(&self, path: &str) -> Result<Url> {
        // "./" keeps a leading segment like `a:b` from parsing as a scheme
        let relative = format!("./{}", encode_path(path.trim_start_matches('/')));
        self.base_url
            .join(&relative)
            .map_err(|e| Error::Http(format!("Invalid request path '{}': {}", path, e)))
    }

    /// True once the app answers anything at all on its base URL
    pub async fn ping(&self) -> bool {
        self.client.get(self.base_url.clone()).send().await.is_ok()
    }

    /// Fetch the app's route listing (`[{ "method": .., "path": .. }]`)
    pub async fn route_listing(&self, path: &str) -> Result<Vec<Route>> {
        let url = self.url_for(path)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::Http(format!(
                "Route listing at {} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json::<Vec<Route>>()
            .await
            .map_err(|e| Error::InvalidData(format!("Invalid route listing from {}: {}", url, e)))
    }
}

#[async_trait]
impl App for HttpApp {
    async fn fetch(&self, request: FetchRequest) -> Result<AppResponse> {
        let url = self.url_for(&request.path)?;
        let mut builder = self.client.get(url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Http(format!("GET {} failed: {}", url, e)))?;

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
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("Failed to read body of {}: {}", url, e)))?
            .to_vec();

        Ok(AppResponse {
            status,
            headers,
            body,
        })
    }
}

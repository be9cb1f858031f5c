use async_trait::async_trait;
use prerender_kit_core::Result;
use prerender_kit_core::protocol::{PARAMS_HEADER, PARAMS_HEADER_VALUE};

/// A request issued against the application under build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Path (or path template when probing), not yet percent-encoded
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Plain page request
    pub fn page(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
        }
    }

    /// Request marked with the params header, asking the route for its parameter sets
    pub fn probe(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: vec![(PARAMS_HEADER.to_string(), PARAMS_HEADER_VALUE.to_string())],
        }
    }

    pub fn is_probe(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(PARAMS_HEADER))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppResponse {
    pub status: u16,
    /// Header names are stored lowercase
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl AppResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// The application being pre-rendered, reachable in-process or over the network
#[async_trait]
pub trait App: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<AppResponse>;
}

#[async_trait]
impl<T: App + ?Sized> App for std::sync::Arc<T> {
    async fn fetch(&self, request: FetchRequest) -> Result<AppResponse> {
        (**self).fetch(request).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory app answering from canned responses, recording every request
    #[derive(Default)]
    pub struct MockApp {
        pages: HashMap<String, AppResponse>,
        probes: HashMap<String, AppResponse>,
        pub requests: Mutex<Vec<FetchRequest>>,
    }

    impl MockApp {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, path: &str, status: u16, body: &str) -> Self {
            self.pages
                .insert(path.to_string(), AppResponse::new(status, body));
            self
        }

        /// Route answers the params protocol with the given JSON body
        pub fn params(mut self, path: &str, json: &str) -> Self {
            self.probes.insert(
                path.to_string(),
                AppResponse::new(200, json).with_header(PARAMS_HEADER, PARAMS_HEADER_VALUE),
            );
            self
        }

        pub fn probed(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.is_probe())
                .map(|r| r.path.clone())
                .collect()
        }
    }

    #[async_trait]
    impl App for MockApp {
        async fn fetch(&self, request: FetchRequest) -> Result<AppResponse> {
            self.requests.lock().unwrap().push(request.clone());
            let probe = if request.is_probe() {
                self.probes.get(&request.path)
            } else {
                None
            };
            Ok(probe
                .or_else(|| self.pages.get(&request.path))
                .cloned()
                .unwrap_or_else(|| AppResponse::new(404, "Not Found")))
        }
    }
}

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// HTTP method a route is registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    /// Wildcard route type that matches any method
    All,
}

impl Method {
    /// Only safe retrieval routes are ever pre-rendered
    pub fn is_prerenderable(self) -> bool {
        matches!(self, Method::Get | Method::All)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
            Method::All => "ALL",
        }
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "HEAD" => Ok(Method::Head),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "OPTIONS" => Ok(Method::Options),
            "ALL" | "*" => Ok(Method::All),
            other => Err(Error::InvalidData(format!("Unknown HTTP method '{}'", other))),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (method, path template) pair registered with the application router
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Route {
    pub method: Method,
    /// Path template, e.g. `/posts/:id{[0-9]+}`
    pub path: String,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// One concrete binding of a route's named parameters, in insertion order
pub type ParameterSet = IndexMap<String, String>;

/// Build a parameter set from `(name, value)` pairs
pub fn param_set<I, K, V>(pairs: I) -> ParameterSet
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// A fully resolved path with no parameter tokens left
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcreteUrl(String);

impl ConcreteUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

impl fmt::Display for ConcreteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConcreteUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ConcreteUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deduplicated URLs in first-seen order. Write-once per build: there is no removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlSet {
    urls: IndexSet<ConcreteUrl>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the URL was already present
    pub fn insert(&mut self, url: ConcreteUrl) -> bool {
        self.urls.insert(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConcreteUrl> {
        self.urls.iter()
    }
}

impl<'a> IntoIterator for &'a UrlSet {
    type Item = &'a ConcreteUrl;
    type IntoIter = indexmap::set::Iter<'a, ConcreteUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}

impl IntoIterator for UrlSet {
    type Item = ConcreteUrl;
    type IntoIter = indexmap::set::IntoIter<ConcreteUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.into_iter()
    }
}

impl Extend<ConcreteUrl> for UrlSet {
    fn extend<T: IntoIterator<Item = ConcreteUrl>>(&mut self, iter: T) {
        self.urls.extend(iter);
    }
}

impl FromIterator<ConcreteUrl> for UrlSet {
    fn from_iter<T: IntoIterator<Item = ConcreteUrl>>(iter: T) -> Self {
        Self {
            urls: iter.into_iter().collect(),
        }
    }
}

/// A fetched page, consumed immediately to produce an output file
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub url: ConcreteUrl,
    pub status: u16,
    pub body: Vec<u8>,
}

impl RenderedPage {
    /// Only an exact 200 is persisted; anything else is skipped
    pub fn is_persistable(&self) -> bool {
        self.status == 200
    }
}

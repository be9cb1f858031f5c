//! Example blog served through [`SsgRouter`]: a home page plus one page per
//! post in the store.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::post;
use prerender_kit_core::{Method, ParameterSet, param_set};
use prerender_kit_generator::{BoxError, RouteTable};
use prerender_kit_server::SsgRouter;
use serde::Deserialize;
use std::sync::Arc;

pub const ROUTES_PATH: &str = "/_ssg/routes";

const POSTS_JSON: &str = include_str!("../data/posts.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    /// Trusted HTML
    pub content: String,
}

/// In-memory post store standing in for a database
#[derive(Debug, Default)]
pub struct PostStore {
    posts: Vec<Post>,
}

impl PostStore {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn bundled() -> anyhow::Result<Self> {
        Ok(Self::new(serde_json::from_str(POSTS_JSON)?))
    }

    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    pub fn find(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }
}

type AppState = Arc<PostStore>;

pub fn app(store: PostStore) -> (Router, RouteTable) {
    let store: AppState = Arc::new(store);
    let ids_store = store.clone();
    let post_ids = move || {
        let store = ids_store.clone();
        async move {
            let ids: Vec<ParameterSet> = store
                .all()
                .iter()
                .map(|post| param_set([("id", post.id.as_str())]))
                .collect();
            tracing::debug!(count = ids.len(), "listing post ids");
            Ok::<_, BoxError>(ids)
        }
    };

    let (router, table) = SsgRouter::new()
        .page("/", index)
        .dynamic("/posts/:id", post_ids, show_post)
        .route(Method::Post, "/posts", post(create_post))
        .with_route_listing(ROUTES_PATH)
        .into_parts();

    (router.with_state(store), table)
}

async fn index(State(store): State<AppState>) -> Html<String> {
    let items: String = store
        .all()
        .iter()
        .map(|post| {
            format!(
                r#"<li><a href="/posts/{}">{}</a></li>"#,
                escape_html(&post.id),
                escape_html(&post.title)
            )
        })
        .collect();

    Html(page(
        "Home",
        &format!("<h1>Welcome!</h1>\n<ul>{}</ul>", items),
    ))
}

async fn show_post(State(store): State<AppState>, Path(id): Path<String>) -> Response {
    match store.find(&id) {
        Some(post) => Html(page(
            &post.title,
            &format!("<h1>{}</h1>\n<div>{}</div>", escape_html(&post.title), post.content),
        ))
        .into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn create_post() -> StatusCode {
    StatusCode::METHOD_NOT_ALLOWED
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{}</title>
</head>
<body>
{}
</body>
</html>
"#,
        escape_html(title),
        body
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prerender_kit_generator::{App, FetchRequest, GenerateOptions, generate};
    use prerender_kit_server::RouterApp;

    fn store() -> PostStore {
        PostStore::new(vec![
            Post {
                id: "1".to_string(),
                title: "First & best".to_string(),
                content: "<p>one</p>".to_string(),
            },
            Post {
                id: "2".to_string(),
                title: "Second".to_string(),
                content: "<p>two</p>".to_string(),
            },
        ])
    }

    #[test]
    fn test_escape_html_covers_attribute_quotes() {
        assert_eq!(
            escape_html(r#"<a href='x' title="y">Tom & Jerry</a>"#),
            "&lt;a href=&#x27;x&#x27; title=&quot;y&quot;&gt;Tom &amp; Jerry&lt;/a&gt;"
        );
    }

    #[test]
    fn test_bundled_posts_parse() {
        let store = PostStore::bundled().unwrap();
        assert_eq!(store.all().len(), 3);
        assert!(store.find("2").is_some());
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let (router, _) = app(store());
        let response = RouterApp::new(router)
            .fetch(FetchRequest::page("/posts/99"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_build_demo_site_in_process() {
        let dir = tempfile::tempdir().unwrap();
        let (router, table) = app(store());
        let options = GenerateOptions {
            output: dir.path().to_path_buf(),
            ..Default::default()
        };

        let report = generate(&table, &RouterApp::new(router), &options)
            .await
            .unwrap();

        assert_eq!(report.written.len(), 3);
        let post = std::fs::read_to_string(dir.path().join("posts/1.html")).unwrap();
        assert!(post.contains("<h1>First &amp; best</h1>"));
        assert!(post.contains("<p>one</p>"));
        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains(r#"<a href="/posts/2">Second</a>"#));
        assert!(!dir.path().join("posts.html").exists());
    }

    #[tokio::test]
    async fn test_build_demo_site_over_probe_protocol() {
        let dir = tempfile::tempdir().unwrap();
        let (router, recorded) = app(store());
        let table = RouteTable::negotiated(recorded.routes().cloned().collect::<Vec<_>>());
        let options = GenerateOptions {
            output: dir.path().to_path_buf(),
            ..Default::default()
        };

        let report = generate(&table, &RouterApp::new(router), &options)
            .await
            .unwrap();
        assert_eq!(report.written.len(), 3);
        assert!(dir.path().join("posts/2.html").exists());
    }
}

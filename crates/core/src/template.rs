//! Route path templates.
//!
//! A template is a path with zero or more named segments of the form `:name`,
//! each optionally followed by an inline constraint pattern (`:id{[0-9]+}`)
//! and/or an optional marker (`:lang?`). A name runs to the next `/`, `{`
//! or `?`, so `:post-id` is one parameter.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::types::ParameterSet;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/:(?P<name>[^/{}?]+)(?:\{(?P<constraint>[^/]+)\})?(?P<optional>\?)?")
        .expect("token regex is valid")
});

/// Characters escaped when a path is put on the wire. `/` and `%` pass through.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'[')
    .add(b']')
    .add(b'|')
    .add(b'\\')
    .add(b'^');

/// A `:name` token located inside a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
    pub name: String,
    pub constraint: Option<String>,
    pub optional: bool,
    /// Byte range of the token including its leading `/`
    pub span: Range<usize>,
    /// A `{` follows the name but never closes before the next `/`
    pub malformed_constraint: bool,
}

/// All parameter tokens in the template, in order of appearance
pub fn tokens(template: &str) -> Vec<ParamToken> {
    TOKEN_RE
        .captures_iter(template)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let constraint = caps.name("constraint").map(|m| m.as_str().to_string());
            let malformed_constraint =
                constraint.is_none() && template[whole.end()..].starts_with('{');
            Some(ParamToken {
                name: caps["name"].to_string(),
                constraint,
                optional: caps.name("optional").is_some(),
                span: whole.range(),
                malformed_constraint,
            })
        })
        .collect()
}

/// Substitute parameter values into a path template.
///
/// For each key, in insertion order, the first `/:key` token (together with
/// its constraint suffix) is replaced by `/<value>`. Keys that do not appear
/// in the template are ignored; tokens with no matching key are left as-is.
pub fn substitute(template: &str, params: &ParameterSet) -> String {
    let mut url = template.to_string();
    for (key, value) in params {
        let span = tokens(&url)
            .into_iter()
            .find(|t| &t.name == key)
            .map(|t| t.span);
        if let Some(span) = span {
            url.replace_range(span, &format!("/{}", value));
        }
    }
    url
}

/// Names of all parameter tokens in the template
pub fn param_names(template: &str) -> Vec<String> {
    tokens(template).into_iter().map(|t| t.name).collect()
}

/// Parameter names still present in a supposedly concrete path
pub fn unresolved_params(path: &str) -> Vec<String> {
    param_names(path)
}

pub fn has_wildcard(path: &str) -> bool {
    path.split('/').any(|segment| segment.contains('*'))
}

/// True when the path can be fetched and written as-is
pub fn is_concrete(path: &str) -> bool {
    unresolved_params(path).is_empty() && !has_wildcard(path)
}

/// Inline constraint pattern attached to `name`, if any
pub fn constraint_for(template: &str, name: &str) -> Option<String> {
    tokens(template)
        .into_iter()
        .find(|t| t.name == name)
        .and_then(|t| t.constraint)
}

/// Convert a template into axum's path syntax: `/posts/:id{[0-9]+}` becomes
/// `/posts/{id}` and a trailing `/*` becomes `/{*wildcard}`.
pub fn to_axum_path(template: &str) -> String {
    let path = TOKEN_RE.replace_all(template, "/{$name}").into_owned();
    match path.strip_suffix("/*") {
        Some(prefix) => format!("{}/{{*wildcard}}", prefix),
        None => path,
    }
}

/// Percent-encode a path (or template) so it is a valid request target
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ParameterSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_single_param() {
        assert_eq!(substitute("/posts/:id", &params(&[("id", "42")])), "/posts/42");
    }

    #[test]
    fn test_substitute_strips_constraint() {
        assert_eq!(
            substitute("/posts/:id{[0-9]+}", &params(&[("id", "42")])),
            "/posts/42"
        );
        assert_eq!(
            substitute(
                "/:year{[0-9]{4}}/:slug{[a-z-]+}",
                &params(&[("slug", "hello"), ("year", "2024")])
            ),
            "/2024/hello"
        );
    }

    #[test]
    fn test_substitute_multiple_params_order_independent() {
        let a = substitute(
            "/users/:user/posts/:post",
            &params(&[("user", "ada"), ("post", "7")]),
        );
        let b = substitute(
            "/users/:user/posts/:post",
            &params(&[("post", "7"), ("user", "ada")]),
        );
        assert_eq!(a, "/users/ada/posts/7");
        assert_eq!(a, b);
    }

    #[test]
    fn test_substitute_ignores_unknown_keys() {
        assert_eq!(
            substitute("/posts/:id", &params(&[("id", "1"), ("lang", "en")])),
            "/posts/1"
        );
    }

    #[test]
    fn test_substitute_missing_key_leaves_token() {
        let url = substitute("/posts/:id/:slug", &params(&[("id", "1")]));
        assert_eq!(url, "/posts/1/:slug");
        assert_eq!(unresolved_params(&url), vec!["slug".to_string()]);
    }

    #[test]
    fn test_substitute_respects_name_boundary() {
        assert_eq!(
            substitute("/a/:identifier/:id", &params(&[("id", "1")])),
            "/a/:identifier/1"
        );
    }

    #[test]
    fn test_substitute_hyphenated_name() {
        assert_eq!(
            substitute("/posts/:post-id", &params(&[("post-id", "1")])),
            "/posts/1"
        );
        assert_eq!(
            substitute("/posts/:post-id{[0-9]+}", &params(&[("post-id", "7")])),
            "/posts/7"
        );
        assert_eq!(param_names("/u/:user.name/:post-id"), vec!["user.name", "post-id"]);
        // `post` alone does not match part of `post-id`
        assert_eq!(
            substitute("/posts/:post-id", &params(&[("post", "1")])),
            "/posts/:post-id"
        );
    }

    #[test]
    fn test_substitute_value_is_literal() {
        assert_eq!(substitute("/p/:id", &params(&[("id", "$1")])), "/p/$1");
    }

    #[test]
    fn test_substitute_optional_marker() {
        assert_eq!(substitute("/docs/:lang?", &params(&[("lang", "en")])), "/docs/en");
    }

    #[test]
    fn test_is_concrete() {
        assert!(is_concrete("/"));
        assert!(is_concrete("/about"));
        assert!(!is_concrete("/posts/:id"));
        assert!(!is_concrete("/*"));
        assert!(!is_concrete("/static/*"));
    }

    #[test]
    fn test_tokens_detect_constraint_and_malformed() {
        let found = tokens("/posts/:id{[0-9]+}/:slug");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].constraint.as_deref(), Some("[0-9]+"));
        assert!(!found[0].malformed_constraint);
        assert_eq!(found[1].constraint, None);

        let broken = tokens("/files/:path{.+/x}");
        assert!(broken[0].malformed_constraint);
    }

    #[test]
    fn test_constraint_for() {
        assert_eq!(
            constraint_for("/posts/:id{[0-9]+}", "id").as_deref(),
            Some("[0-9]+")
        );
        assert_eq!(constraint_for("/posts/:id", "id"), None);
        assert_eq!(constraint_for("/posts/:id", "slug"), None);
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("/posts/42"), "/posts/42");
        assert_eq!(
            encode_path("/posts/:id{[0-9]+}"),
            "/posts/:id%7B%5B0-9%5D+%7D"
        );
        assert_eq!(encode_path("/tags/hello world"), "/tags/hello%20world");
        assert_eq!(encode_path("/caf\u{e9}"), "/caf%C3%A9");
    }

    #[test]
    fn test_to_axum_path() {
        assert_eq!(to_axum_path("/"), "/");
        assert_eq!(to_axum_path("/posts/:id{[0-9]+}"), "/posts/{id}");
        assert_eq!(to_axum_path("/u/:user/p/:post"), "/u/{user}/p/{post}");
        assert_eq!(to_axum_path("/assets/*"), "/assets/{*wildcard}");
        assert_eq!(to_axum_path("/posts/:post-id"), "/posts/{post-id}");
    }
}

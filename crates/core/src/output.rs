use crate::error::{Error, Result};
use crate::types::ConcreteUrl;
use std::path::{Component, Path, PathBuf};

/// Map a concrete URL to the file it is written to under `root`.
///
/// `/` maps to `index.html`; any other URL `/a/b` maps to `a/b.html`.
/// A trailing slash is ignored, so `/about/` also maps to `about.html`.
///
/// ```text
/// output_path("dist", "/")         → dist/index.html
/// output_path("dist", "/posts/42") → dist/posts/42.html
/// output_path("dist", "/../etc")   → Err("Parent directory references...")
/// ```
pub fn output_path(root: &Path, url: &ConcreteUrl) -> Result<PathBuf> {
    let invalid = |reason: &str| Error::InvalidOutputPath {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    if url.as_str().contains('\0') {
        return Err(invalid("NUL byte in URL"));
    }

    let relative = url.as_str().trim_start_matches('/').trim_end_matches('/');
    if relative.is_empty() {
        return Ok(root.join("index.html"));
    }

    let relative = Path::new(relative);
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => return Err(invalid("'.' segments are not allowed")),
            Component::ParentDir => {
                return Err(invalid("Parent directory references (..) are not allowed"));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("URL resolves to an absolute path"));
            }
        }
    }

    let mut file = root.join(relative).into_os_string();
    file.push(".html");
    Ok(PathBuf::from(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_for(url: &str) -> Result<PathBuf> {
        output_path(Path::new("dist"), &ConcreteUrl::new(url))
    }

    #[test]
    fn test_output_path_root_maps_to_index() {
        assert_eq!(path_for("/").unwrap(), Path::new("dist/index.html"));
    }

    #[test]
    fn test_output_path_nested() {
        assert_eq!(path_for("/posts/42").unwrap(), Path::new("dist/posts/42.html"));
        assert_eq!(path_for("/about").unwrap(), Path::new("dist/about.html"));
    }

    #[test]
    fn test_output_path_ignores_trailing_slash() {
        assert_eq!(path_for("/about/").unwrap(), Path::new("dist/about.html"));
    }

    #[test]
    fn test_output_path_keeps_dots_in_names() {
        assert_eq!(
            path_for("/releases/v1.2").unwrap(),
            Path::new("dist/releases/v1.2.html")
        );
    }

    #[test]
    fn test_output_path_rejects_traversal() {
        let result = path_for("/../etc/passwd");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Parent directory references")
        );
        assert!(path_for("/posts/../../secret").is_err());
        assert!(path_for("/./x").is_err());
    }
}

// Route table validation

use prerender_kit_core::template;
use prerender_kit_generator::{ParamSource, RouteTable};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "✗ {}", error)?;
        }
        for warning in &self.warnings {
            writeln!(f, "⚠ {}", warning)?;
        }
        for info in &self.info {
            writeln!(f, "ℹ {}", info)?;
        }
        Ok(())
    }
}

/// Check that every route template is well-formed before anything is fetched
pub fn validate_routes(table: &RouteTable) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen = HashSet::new();

    for entry in table.entries() {
        let route = &entry.route;

        if !seen.insert((route.method, route.path.as_str())) {
            report
                .warnings
                .push(format!("{}: registered more than once", route));
        }

        if !route.method.is_prerenderable() {
            report
                .info
                .push(format!("{}: not pre-rendered ({} routes are skipped)", route, route.method));
            continue;
        }

        if template::has_wildcard(&route.path) {
            report
                .info
                .push(format!("{}: wildcard route, not pre-rendered", route));
            continue;
        }

        let tokens = template::tokens(&route.path);
        let mut names = HashSet::new();
        for token in &tokens {
            if !names.insert(token.name.as_str()) {
                report.errors.push(format!(
                    "{}: parameter ':{}' appears more than once",
                    route, token.name
                ));
            }
            if token.malformed_constraint {
                report.errors.push(format!(
                    "{}: constraint for ':{}' is unterminated or contains '/'",
                    route, token.name
                ));
            }
        }

        if matches!(entry.source, ParamSource::Static) && !tokens.is_empty() {
            report.errors.push(format!(
                "{}: registered as static but has parameters ({})",
                route,
                template::param_names(&route.path).join(", ")
            ));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use prerender_kit_core::{Method, Route};

    #[test]
    fn test_valid_table_has_no_errors() {
        let table = RouteTable::negotiated(vec![
            Route::get("/"),
            Route::get("/posts/:id{[0-9]+}"),
            Route::get("/u/:user/:post"),
        ]);
        let report = validate_routes(&table);
        assert!(report.is_ok(), "{}", report);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_duplicate_parameter_names() {
        let table = RouteTable::negotiated(vec![Route::get("/a/:id/b/:id")]);
        let report = validate_routes(&table);
        assert!(!report.is_ok());
        assert!(report.errors[0].contains(":id"));
    }

    #[test]
    fn test_constraint_with_slash() {
        let table = RouteTable::negotiated(vec![Route::get("/files/:path{.+/x}")]);
        let report = validate_routes(&table);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("constraint"));
    }

    #[test]
    fn test_static_route_with_parameters() {
        let table = RouteTable::builder()
            .static_route(Method::Get, "/posts/:id")
            .build();
        let report = validate_routes(&table);
        assert!(report.errors[0].contains("registered as static"));
    }

    #[test]
    fn test_duplicate_routes_warn() {
        let table = RouteTable::negotiated(vec![Route::get("/"), Route::get("/")]);
        let report = validate_routes(&table);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_skipped_routes_are_reported_as_info() {
        let table = RouteTable::negotiated(vec![
            Route::new(Method::Post, "/a/:id/b/:id"),
            Route::new(Method::All, "/*"),
        ]);
        let report = validate_routes(&table);
        // Mutating routes are never checked further
        assert!(report.is_ok());
        assert_eq!(report.info.len(), 2);
    }
}

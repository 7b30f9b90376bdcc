//! Which application routes require an authenticated session.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

/// Auth-required route patterns. `:name` segments match any single segment.
pub const PROTECTED_ROUTES: &[&str] = &[
    "/aiph",
    "/team",
    "/meetings",
    "/objectives",
    "/key-results",
    "/evaluations",
    "/objective-dashboard/:id",
];

/// Metadata the guard evaluates for a transition target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMeta {
    pub path: String,
    pub requires_auth: bool,
}

impl RouteMeta {
    pub fn public(path: impl Into<String>) -> Self {
        Self { path: path.into(), requires_auth: false }
    }

    pub fn protected(path: impl Into<String>) -> Self {
        Self { path: path.into(), requires_auth: true }
    }
}

#[derive(Clone, Debug)]
pub struct RouteTable {
    protected: Vec<String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(PROTECTED_ROUTES.iter().copied())
    }
}

impl RouteTable {
    pub fn new<'a>(protected: impl IntoIterator<Item = &'a str>) -> Self {
        Self { protected: protected.into_iter().map(str::to_owned).collect() }
    }

    /// Metadata for a concrete path; query string and fragment are ignored.
    pub fn resolve(&self, path: &str) -> RouteMeta {
        let requires_auth = self.protected.iter().any(|pattern| pattern_matches(pattern, path));
        RouteMeta { path: path.to_owned(), requires_auth }
    }
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let expected = segments(pattern);
    let actual = segments(path);
    expected.len() == actual.len()
        && expected.iter().zip(&actual).all(|(want, got)| want.starts_with(':') || want == got)
}

//! Route path resolution: mapping relative file paths to URL route strings.
//!
//! The rules are conventional rather than configurable:
//!
//! - the recognized extensions (`.yaml`, `.yml`) are stripped;
//! - a final `index` segment collapses into its parent directory, so
//!   `a/index.yaml` and `a.yaml` resolve to the same route;
//! - a segment starting with `_` anywhere in the path hides the file from
//!   registration (`_middleware` files are consumed separately by the
//!   middleware resolver);
//! - `:name` segments are kept verbatim for registration and rendered as
//!   `{name}` in the schema document.

use http::Method;

/// File extensions recognized as endpoint definition files.
pub const ROUTE_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// File stem reserved for per-directory shared middleware definitions.
pub const MIDDLEWARE_STEM: &str = "_middleware";

/// HTTP method vocabulary accepted in endpoint files.
///
/// The canonical spelling for HTTP DELETE is `delete`; `del` is accepted as
/// a parse alias and normalized. `All` registers for every method and is
/// matched last-resort by the reference router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    All,
    Options,
}

/// Endpoint file keys probed for method definitions, in processing order.
///
/// Both DELETE spellings are probed; a file declaring both trips the
/// duplicate-route guard on the second one.
pub const METHOD_KEYS: [(&str, RouteMethod); 8] = [
    ("get", RouteMethod::Get),
    ("post", RouteMethod::Post),
    ("put", RouteMethod::Put),
    ("patch", RouteMethod::Patch),
    ("del", RouteMethod::Delete),
    ("delete", RouteMethod::Delete),
    ("all", RouteMethod::All),
    ("options", RouteMethod::Options),
];

impl RouteMethod {
    /// Parse an endpoint file key into a method, accepting the `del` alias.
    pub fn parse(key: &str) -> Option<Self> {
        METHOD_KEYS
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, m)| *m)
    }

    /// Canonical lowercase spelling, used as the operation key in the
    /// schema document.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMethod::Get => "get",
            RouteMethod::Post => "post",
            RouteMethod::Put => "put",
            RouteMethod::Patch => "patch",
            RouteMethod::Delete => "delete",
            RouteMethod::All => "all",
            RouteMethod::Options => "options",
        }
    }

    /// Whether an incoming HTTP method is served by this registration.
    pub fn matches(&self, method: &Method) -> bool {
        match self {
            RouteMethod::Get => *method == Method::GET,
            RouteMethod::Post => *method == Method::POST,
            RouteMethod::Put => *method == Method::PUT,
            RouteMethod::Patch => *method == Method::PATCH,
            RouteMethod::Delete => *method == Method::DELETE,
            RouteMethod::Options => *method == Method::OPTIONS,
            RouteMethod::All => true,
        }
    }
}

impl std::fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_ascii_uppercase())
    }
}

/// True if any `/`-separated segment starts with `_`.
///
/// Hidden files are excluded from route registration entirely; the
/// middleware resolver reads `_middleware` files through its own pass.
pub fn is_hidden(rel: &str) -> bool {
    rel.split('/').any(|seg| seg.starts_with('_'))
}

/// Strip a recognized endpoint extension, returning the stem.
pub fn strip_route_extension(rel: &str) -> Option<&str> {
    ROUTE_EXTENSIONS.iter().find_map(|ext| {
        rel.strip_suffix(ext)
            .and_then(|s| s.strip_suffix('.'))
    })
}

/// Resolve a relative file path (forward-slash segments) into a route string.
///
/// Returns `None` for files that are not endpoint definitions: unrecognized
/// extensions and hidden paths. The `prefix` is prepended verbatim; an empty
/// prefix yields routes rooted at `/`.
///
/// A final `index` segment is removed together with the preceding separator,
/// which is how a directory's root endpoint is expressed:
///
/// ```
/// use fsroutes::routing::route_from_rel_path;
///
/// assert_eq!(route_from_rel_path("a/index.yaml", ""), Some("/a".to_string()));
/// assert_eq!(route_from_rel_path("a.yaml", ""), Some("/a".to_string()));
/// assert_eq!(route_from_rel_path("a/:b/c.yaml", "/api"), Some("/api/a/:b/c".to_string()));
/// assert_eq!(route_from_rel_path("_private/x.yaml", ""), None);
/// ```
pub fn route_from_rel_path(rel: &str, prefix: &str) -> Option<String> {
    if is_hidden(rel) {
        return None;
    }
    let stem = strip_route_extension(rel)?;
    let stem = if stem == "index" {
        ""
    } else {
        stem.strip_suffix("/index").unwrap_or(stem)
    };
    Some(format!("{prefix}/{stem}"))
}

/// Convert a route to the OpenAPI path template form: `:name` segments
/// become `{name}`, everything else passes through unchanged.
pub fn to_openapi_path(route: &str) -> String {
    route
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Ancestor directories of a route, relative to the routes root, ordered
/// root-most first.
///
/// Ancestors are derived from the route rather than the file location so
/// that `<dir>/index.yaml` and `<dir>.yaml` resolve to identical middleware
/// chains. The routes root itself is not included; its `_middleware` file
/// is the separate top-most tier.
pub fn ancestor_dirs(route: &str) -> Vec<String> {
    let segments: Vec<&str> = route
        .trim_start_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let mut dirs = Vec::new();
    let mut acc = String::new();
    for seg in segments.iter().take(segments.len().saturating_sub(1)) {
        if !acc.is_empty() {
            acc.push('/');
        }
        acc.push_str(seg);
        dirs.push(acc.clone());
    }
    dirs
}

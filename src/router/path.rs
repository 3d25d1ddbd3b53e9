use crate::versioner::Strategy;

/// Squeezes repeated slashes, drops a trailing slash and ensures a leading
/// one. `""` and `"//"` normalise to `"/"`.
///
/// ```
/// use paramgate::router::normalize_path;
///
/// assert_eq!(normalize_path("api//v1/users/"), "/api/v1/users");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 1);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Pieces a route template is assembled from.
///
/// The composed path is `mount_path / root_prefix / :version / namespace /
/// raw_path`, normalised, followed by a format suffix:
///
/// - `(.json)` when the route serves exactly one content type,
/// - `(/.:format)` for a path-versioned route with no namespace or path of
///   its own (the bare `/:version` root),
/// - `(.:format)` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutePath {
    pub raw_path: Option<String>,
    pub namespace: Option<String>,
    pub mount_path: Option<String>,
    pub root_prefix: Option<String>,
    /// Version strategy, when the route is versioned.
    pub version_strategy: Option<Strategy>,
    /// Declared format and the number of content types the route serves.
    pub format: Option<String>,
    pub content_type_count: usize,
}

impl RoutePath {
    pub fn new(raw_path: impl Into<String>) -> Self {
        Self {
            raw_path: Some(raw_path.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = Some(mount_path.into());
        self
    }

    #[must_use]
    pub fn root_prefix(mut self, root_prefix: impl Into<String>) -> Self {
        self.root_prefix = Some(root_prefix.into());
        self
    }

    #[must_use]
    pub fn versioned(mut self, strategy: Strategy) -> Self {
        self.version_strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn format(mut self, format: impl Into<String>, content_type_count: usize) -> Self {
        self.format = Some(format.into());
        self.content_type_count = content_type_count;
        self
    }

    pub fn uses_specific_format(&self) -> bool {
        self.format.is_some() && self.content_type_count == 1
    }

    pub fn uses_path_versioning(&self) -> bool {
        self.version_strategy == Some(Strategy::Path)
    }

    /// Normalised path without the format suffix.
    pub fn path(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(5);
        parts.extend(self.mount_path.as_deref());
        parts.extend(self.root_prefix.as_deref().filter(|p| !p.trim().is_empty()));
        if self.uses_path_versioning() {
            parts.push(":version");
        }
        parts.extend(self.namespace.as_deref());
        parts.extend(self.raw_path.as_deref());
        let joined = parts
            .into_iter()
            .filter(|p| *p != "/")
            .collect::<Vec<_>>()
            .join("/");
        normalize_path(&joined)
    }

    pub fn suffix(&self) -> String {
        if let (true, Some(format)) = (self.uses_specific_format(), self.format.as_deref()) {
            return format!("(.{format})");
        }
        if !self.uses_path_versioning() || has_own_segment(self.namespace.as_deref()) || has_own_segment(self.raw_path.as_deref()) {
            "(.:format)".to_string()
        } else {
            "(/.:format)".to_string()
        }
    }

    pub fn path_with_suffix(&self) -> String {
        format!("{}{}", self.path(), self.suffix())
    }
}

fn has_own_segment(part: Option<&str>) -> bool {
    part.is_some_and(|p| p.starts_with(|c: char| !c.is_whitespace()) && p != "/")
}

impl std::fmt::Display for RoutePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path_with_suffix())
    }
}

use super::core::ParamVec;
use crate::error::SchemaError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// Default capture for `:name` and `{name}`: one path segment, no extension.
const SEGMENT: &str = "[^/.?#]+";
/// Capture for `*name`: anything, as little as possible.
const GLOB: &str = ".*?";

/// A compiled route template.
///
/// | Syntax       | Meaning                                   |
/// |--------------|-------------------------------------------|
/// | `:id`, `{id}`| named segment, `[^/.?#]+` unless required otherwise |
/// | `*path`      | named glob (`*` alone captures `splat`)   |
/// | `( ... )`    | optional part                             |
///
/// Everything else matches literally. Captures are reported in template
/// order; captures that did not take part in a match, or matched nothing,
/// are omitted unless a default is configured.
///
/// ```
/// use paramgate::router::RoutePattern;
///
/// let pattern = RoutePattern::new("/users/:id(.:format)").unwrap();
/// let params = pattern.params("/users/42.json").unwrap();
/// assert_eq!(params[0].1, "42");
/// assert_eq!(params[1].1, "json");
/// assert!(pattern.params("/users/42/posts").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    origin: String,
    source: String,
    regex: Regex,
    names: Vec<Arc<str>>,
    defaults: Vec<(Arc<str>, String)>,
    anchored: bool,
}

impl RoutePattern {
    pub fn new(template: &str) -> Result<Self, SchemaError> {
        Self::compile(template, &HashMap::new(), true)
    }

    /// Compiles `template`, using `requirements[name]` as the regex of the
    /// capture `name`. Unanchored patterns match any path that starts with
    /// the template.
    pub fn compile(
        template: &str,
        requirements: &HashMap<String, String>,
        anchored: bool,
    ) -> Result<Self, SchemaError> {
        let mut source = String::with_capacity(template.len() * 2 + 2);
        let mut names: Vec<Arc<str>> = Vec::new();
        let mut depth = 0usize;
        let mut chars = template.char_indices().peekable();
        let mut origin_end = None;

        source.push('^');
        while let Some((index, c)) = chars.next() {
            match c {
                ':' | '*' => {
                    let mut name = String::new();
                    while let Some(&(_, n)) = chars.peek() {
                        if n.is_ascii_alphanumeric() || n == '_' {
                            name.push(n);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if name.is_empty() {
                        if c == ':' {
                            return Err(SchemaError::invalid_pattern(template, "capture without a name"));
                        }
                        name.push_str("splat");
                    }
                    let default = if c == '*' { GLOB } else { SEGMENT };
                    push_capture(&mut source, &mut names, template, &name, requirements, default)?;
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed || name.is_empty() {
                        return Err(SchemaError::invalid_pattern(template, "unterminated `{` capture"));
                    }
                    push_capture(&mut source, &mut names, template, &name, requirements, SEGMENT)?;
                }
                '(' => {
                    if depth == 0 && origin_end.is_none() {
                        origin_end = Some(index);
                    }
                    depth += 1;
                    source.push_str("(?:");
                }
                ')' => {
                    if depth == 0 {
                        return Err(SchemaError::invalid_pattern(template, "unbalanced `)`"));
                    }
                    depth -= 1;
                    source.push_str(")?");
                }
                other => {
                    let mut buf = [0u8; 4];
                    source.push_str(&regex::escape(other.encode_utf8(&mut buf)));
                }
            }
        }
        if depth != 0 {
            return Err(SchemaError::invalid_pattern(template, "unbalanced `(`"));
        }
        if anchored {
            source.push('$');
        }

        let regex = Regex::new(&source).map_err(|e| SchemaError::invalid_pattern(template, e))?;
        let origin = origin_end.map_or(template, |end| &template[..end]).to_string();
        Ok(Self {
            origin,
            source,
            regex,
            names,
            defaults: Vec::new(),
            anchored,
        })
    }

    /// Values reported for captures that did not match.
    #[must_use]
    pub fn with_defaults<I, K, V>(mut self, defaults: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in defaults {
            if let Some(known) = self.names.iter().find(|n| n.as_ref() == name.as_ref()) {
                self.defaults.push((Arc::clone(known), value.into()));
            }
        }
        self
    }

    /// Template up to its first optional part: the literal prefix used by
    /// forward matching.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Regex source the template compiled to.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured parameters, or `None` when `path` does not match. Values are
    /// percent-decoded.
    pub fn params(&self, path: &str) -> Option<ParamVec> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for name in &self.names {
            match captures.name(name).map(|m| m.as_str()).filter(|v| !v.is_empty()) {
                Some(raw) => {
                    let value = urlencoding::decode(raw).map_or_else(|_| raw.to_string(), |v| v.into_owned());
                    params.push((Arc::clone(name), value));
                }
                None => {
                    if let Some((_, default)) = self.defaults.iter().find(|(n, _)| n == name) {
                        params.push((Arc::clone(name), default.clone()));
                    }
                }
            }
        }
        Some(params)
    }
}

fn push_capture(
    source: &mut String,
    names: &mut Vec<Arc<str>>,
    template: &str,
    name: &str,
    requirements: &HashMap<String, String>,
    default: &str,
) -> Result<(), SchemaError> {
    if names.iter().any(|n| n.as_ref() == name) {
        return Err(SchemaError::invalid_pattern(template, format!("duplicate capture `{name}`")));
    }
    let body = requirements.get(name).map_or(default, String::as_str);
    if let Err(e) = Regex::new(body) {
        return Err(SchemaError::invalid_pattern(template, format!("requirement for `{name}`: {e}")));
    }
    source.push_str("(?P<");
    source.push_str(name);
    source.push('>');
    source.push_str(body);
    source.push(')');
    names.push(Arc::from(name));
    Ok(())
}

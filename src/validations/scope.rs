use super::errors::{FieldPath, PathSegment};
use super::validators::{is_blank, Validator};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Index of a scope inside its [`ParamsTree`](super::ParamsTree). The root is `ScopeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(pub(crate) usize);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Shape of the input a nested scope walks into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// Each array member is validated as its own element.
    Array,
    Hash,
}

type DependencyFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Condition a lateral (`given`) scope places on a sibling parameter.
#[derive(Clone)]
pub enum Dependency {
    /// The parameter is present and not blank.
    Present(String),
    /// The predicate accepts the parameter's value (`null` when absent).
    Predicate(String, Arc<DependencyFn>),
}

impl Dependency {
    pub fn present(name: impl Into<String>) -> Self {
        Dependency::Present(name.into())
    }

    pub fn predicate<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Dependency::Predicate(name.into(), Arc::new(f))
    }

    pub fn name(&self) -> &str {
        match self {
            Dependency::Present(name) | Dependency::Predicate(name, _) => name,
        }
    }

    pub(crate) fn holds(&self, params: &Map<String, Value>) -> bool {
        match self {
            Dependency::Present(name) => params.get(name).is_some_and(|v| !is_blank(v)),
            Dependency::Predicate(name, f) => f(params.get(name).unwrap_or(&Value::Null)),
        }
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Present(name) => f.debug_tuple("Present").field(name).finish(),
            Dependency::Predicate(name, _) => f.debug_tuple("Predicate").field(name).finish(),
        }
    }
}

/// A parameter declared directly in one scope.
#[derive(Debug, Clone)]
pub struct DeclaredParam {
    pub name: String,
    /// `as:` rename applied by [`ParamsTree::declared`](super::ParamsTree::declared).
    pub rename: Option<String>,
    pub required: bool,
    /// Type signature, when one was declared.
    pub type_name: Option<String>,
    pub desc: Option<String>,
    /// Nested scope opened for this parameter.
    pub child: Option<ScopeId>,
}

impl DeclaredParam {
    pub fn output_name(&self) -> &str {
        self.rename.as_deref().unwrap_or(&self.name)
    }
}

/// One node of the validation tree.
///
/// Scopes are built once and only read afterwards; per-request state (the
/// current slice of input, array indices, collected errors) lives in the engine.
#[derive(Debug)]
pub struct ParamScope {
    pub(crate) element: Option<String>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) optional: bool,
    pub(crate) group: Option<GroupKind>,
    pub(crate) dependent_on: Vec<Dependency>,
    pub(crate) declared: Vec<DeclaredParam>,
    pub(crate) validators: Vec<Arc<dyn Validator>>,
    pub(crate) children: Vec<ScopeId>,
}

impl ParamScope {
    pub(crate) fn root() -> Self {
        Self {
            element: None,
            parent: None,
            optional: false,
            group: None,
            dependent_on: Vec::new(),
            declared: Vec::new(),
            validators: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn element(&self) -> Option<&str> {
        self.element.as_deref()
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn group(&self) -> Option<GroupKind> {
        self.group
    }

    pub fn dependent_on(&self) -> &[Dependency] {
        &self.dependent_on
    }

    pub fn declared_params(&self) -> &[DeclaredParam] {
        &self.declared
    }

    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Has a parent and an element name.
    pub fn is_nested(&self) -> bool {
        self.parent.is_some() && self.element.is_some()
    }

    /// Has a parent but no element: a conditional block at its parent's level.
    pub fn is_lateral(&self) -> bool {
        self.parent.is_some() && self.element.is_none()
    }

    pub(crate) fn meets_dependency(&self, params: &Map<String, Value>) -> bool {
        self.dependent_on.iter().all(|d| d.holds(params))
    }
}

/// Walks parent links from `scope` to the root, producing the full name of
/// `name`. Array ancestors consume `indices` innermost-first; a missing index
/// renders as `0`.
pub(crate) fn full_name(scopes: &[ParamScope], scope: ScopeId, name: &str, indices: &[usize]) -> FieldPath {
    let mut path = FieldPath::root();
    path.push(PathSegment::Key(name.to_string()));
    let mut remaining = indices.iter().rev();
    let mut current = scope;
    while let Some(node) = scopes.get(current.0) {
        if let Some(element) = &node.element {
            if node.group == Some(GroupKind::Array) {
                path.push(PathSegment::Index(remaining.next().copied().unwrap_or(0)));
            }
            path.push(PathSegment::Key(element.clone()));
        }
        match node.parent {
            Some(parent) => current = parent,
            None => break,
        }
    }
    path.reverse();
    path
}

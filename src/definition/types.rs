use crate::validations::validators::Relation;
use crate::versioner::VersionOptions;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A complete API: shared settings plus its routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiDefinition {
    pub name: Option<String>,
    pub mount_path: Option<String>,
    /// Root prefix placed before every route (`api` → `/api/...`).
    pub prefix: Option<String>,
    /// Format every route serves unless it declares its own.
    pub format: Option<String>,
    pub default_format: Option<String>,
    /// Content types the API serves; empty means the built-in table.
    pub content_types: Vec<ContentTypeDef>,
    /// Versioning applied to every route without its own `version`.
    pub version: Option<VersionOptions>,
    /// Report required fields of an explicitly empty array group at index 0.
    pub empty_array_placeholder: Option<bool>,
    pub routes: Vec<RouteDef>,
}

/// `json` (a built-in format) or `{csv: text/csv}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ContentTypeDef {
    Builtin(String),
    Custom(BTreeMap<String, String>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteDef {
    pub method: String,
    pub path: String,
    pub handler: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Regex per capture name.
    #[serde(default)]
    pub requirements: BTreeMap<String, String>,
    /// Values for optional captures that did not match.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    #[serde(default)]
    pub forward_match: bool,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub version: Option<VersionOptions>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(flatten)]
    pub scope: ScopeDef,
}

/// Declarations of one scope level.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScopeDef {
    pub params: Vec<ParamDef>,
    pub relations: Vec<RelationDef>,
    pub given: Vec<GivenDef>,
}

impl ScopeDef {
    pub fn is_empty(&self) -> bool {
        self.params.is_empty() && self.relations.is_empty() && self.given.is_empty()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamDef {
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "type")]
    pub ty: Option<String>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    /// List, `{min, max}` range, or `{value: ...}`.
    #[serde(default)]
    pub values: Option<Value>,
    #[serde(default)]
    pub except_values: Option<Value>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub allow_blank: Option<bool>,
    #[serde(default)]
    pub regexp: Option<String>,
    #[serde(default)]
    pub length: Option<LengthDef>,
    #[serde(default)]
    pub same_as: Option<String>,
    #[serde(default, rename = "as")]
    pub as_name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub fail_fast: bool,
    #[serde(default)]
    pub coerce_message: Option<String>,
    /// Message override per validator name.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    /// Registry validators by name with their options.
    #[serde(default)]
    pub validates: BTreeMap<String, Value>,
    /// Nested declarations; any turns the parameter into a group.
    #[serde(flatten)]
    pub scope: ScopeDef,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LengthDef {
    pub min: Option<usize>,
    pub max: Option<usize>,
    pub is: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelationDef {
    pub rule: Relation,
    pub params: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GivenDef {
    pub depends_on: Vec<DependencyDef>,
    #[serde(flatten)]
    pub scope: ScopeDef,
}

/// `name` (present and not blank), `{param, equals}` or `{param, in: [...]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DependencyDef {
    Present(String),
    Equals {
        param: String,
        equals: Value,
    },
    OneOf {
        param: String,
        #[serde(rename = "in")]
        one_of: Vec<Value>,
    },
}

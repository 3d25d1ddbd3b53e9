use super::types::{ApiDefinition, ContentTypeDef, DependencyDef, ParamDef, RouteDef, ScopeDef};
use crate::coerce::TypeDescriptor;
use crate::dispatcher::Dispatcher;
use crate::error::SchemaError;
use crate::format::{ContentTypes, DEFAULT_FORMAT};
use crate::router::{Route, RouteMethod, RoutePath, RoutePattern, Router};
use crate::runtime_config::RuntimeConfig;
use crate::validations::{value_set_from_options, Dependency, ParamDecl, ParamsBuilder, ScopeBuilder, ValidationOptions};
use crate::versioner::{self, Strategy, VersionOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Compiles `definition` into a ready [`Dispatcher`]. Every declaration
/// problem is reported here, before any request is served.
pub fn build_dispatcher(definition: &ApiDefinition, config: &RuntimeConfig) -> Result<Dispatcher, SchemaError> {
    let content_types = content_types(&definition.content_types)?;
    let routes = definition
        .routes
        .iter()
        .map(|route| build_route(definition, route, &content_types, config))
        .collect::<Result<Vec<_>, _>>()?;

    let default_format = definition.default_format.as_deref().unwrap_or(DEFAULT_FORMAT);
    Ok(Dispatcher::new(Router::with_config(routes, config))
        .with_content_types(content_types)
        .with_default_format(default_format))
}

fn content_types(defs: &[ContentTypeDef]) -> Result<ContentTypes, SchemaError> {
    if defs.is_empty() {
        return Ok(ContentTypes::default());
    }
    let builtins = ContentTypes::default();
    let mut types = ContentTypes::none();
    for def in defs {
        match def {
            ContentTypeDef::Builtin(format) => {
                let mime = builtins
                    .mime_for(format)
                    .ok_or_else(|| SchemaError::invalid_options("content_types", format!("unknown format `{format}`")))?;
                types.insert(format.clone(), mime);
            }
            ContentTypeDef::Custom(entries) => {
                for (format, mime) in entries {
                    types.insert(format.clone(), mime.clone());
                }
            }
        }
    }
    Ok(types)
}

fn build_route(
    api: &ApiDefinition,
    def: &RouteDef,
    content_types: &ContentTypes,
    config: &RuntimeConfig,
) -> Result<Route, SchemaError> {
    let method: RouteMethod = def.method.parse()?;
    let version = def.version.clone().or_else(|| api.version.clone()).map(|options| VersionOptions {
        mount_path: options.mount_path.or_else(|| api.mount_path.clone()),
        prefix: options.prefix.or_else(|| api.prefix.clone()),
        ..options
    });
    let format = def.format.as_deref().or(api.format.as_deref());

    let mut path = RoutePath::new(def.path.as_str());
    path.mount_path = api.mount_path.clone();
    path.root_prefix = api.prefix.clone();
    path.namespace = def.namespace.clone();
    path.version_strategy = version.as_ref().map(|v| v.using);
    if let Some(format) = format {
        path = path.format(format, content_types.len());
    }
    let template = path.path_with_suffix();

    let requirements: HashMap<String, String> = def.requirements.clone().into_iter().collect();
    let pattern = RoutePattern::compile(&template, &requirements, !def.forward_match)?
        .with_defaults(def.defaults.iter().map(|(k, v)| (k.as_str(), v.clone())));

    let mut route = Route::new(method, pattern, &def.handler);
    if let Some(description) = &def.description {
        route = route.with_description(description.clone());
    }
    if let Some(format) = format {
        route = route.with_format(format);
    }
    for (key, value) in &def.metadata {
        route = route.with_metadata(key.clone(), value.clone());
    }
    if !def.scope.is_empty() {
        let mut options = ValidationOptions::from(config);
        if let Some(placeholder) = api.empty_array_placeholder {
            options.empty_array_placeholder = placeholder;
        }
        let tree = ParamsBuilder::new()
            .options(options)
            .build(|root| apply_scope(root, &def.scope))?;
        route = route.with_params(Arc::new(tree));
    }
    if let Some(version) = version {
        if version.using == Strategy::Path && version.versions.is_empty() {
            debug!(handler_name = %def.handler, "Path-versioned route accepts any version");
        }
        route = route.with_versioner(versioner::build(version, content_types)?);
    }
    debug!(
        method = %def.method,
        template = %template,
        handler_name = %def.handler,
        "Route compiled"
    );
    Ok(route)
}

/// Declares `scope` into `builder`: parameters first, then conditional
/// blocks, then relational rules.
pub(crate) fn apply_scope(builder: &mut ScopeBuilder<'_>, scope: &ScopeDef) -> Result<(), SchemaError> {
    for param in &scope.params {
        declare_param(builder, param)?;
    }
    for given in &scope.given {
        let dependencies: Vec<Dependency> = given.depends_on.iter().map(dependency).collect();
        builder.given(dependencies, |inner| apply_scope(inner, &given.scope))?;
    }
    for relation in &scope.relations {
        let attrs: Vec<&str> = relation.params.iter().map(String::as_str).collect();
        builder.relation(relation.rule, &attrs, relation.message.clone())?;
    }
    Ok(())
}

fn declare_param(builder: &mut ScopeBuilder<'_>, param: &ParamDef) -> Result<(), SchemaError> {
    let decl = param_decl(param)?;
    let name = param.name.as_str();
    match (param.scope.is_empty(), param.required) {
        (true, true) => builder.requires(name, decl)?,
        (true, false) => builder.optional(name, decl)?,
        (false, true) => builder.requires_group(name, decl, |inner| apply_scope(inner, &param.scope))?,
        (false, false) => builder.optional_group(name, decl, |inner| apply_scope(inner, &param.scope))?,
    };
    for (validator, options) in &param.validates {
        builder.validates(&[name], validator, options.clone())?;
    }
    Ok(())
}

fn param_decl(param: &ParamDef) -> Result<ParamDecl, SchemaError> {
    let mut decl = ParamDecl::new();
    if let Some(ty) = &param.ty {
        decl = decl.ty(ty.parse::<TypeDescriptor>()?);
    }
    if let Some(types) = &param.types {
        let types = types
            .iter()
            .map(|t| t.parse::<TypeDescriptor>())
            .collect::<Result<Vec<_>, _>>()?;
        decl = decl.types(types);
    }
    if let Some(values) = &param.values {
        decl = decl.values(value_set_from_options("values", values)?);
    }
    if let Some(except) = &param.except_values {
        decl = decl.except_values(value_set_from_options("except_values", except)?);
    }
    if let Some(default) = &param.default {
        decl = decl.default_value(default.clone());
    }
    if let Some(allow_blank) = param.allow_blank {
        decl = decl.allow_blank(allow_blank);
    }
    if let Some(regexp) = &param.regexp {
        decl = decl.regexp(regexp.clone());
    }
    if let Some(length) = param.length {
        decl = match length.is {
            Some(is) => decl.length_is(is),
            None => decl.length(length.min, length.max),
        };
    }
    if let Some(other) = &param.same_as {
        decl = decl.same_as(other.clone());
    }
    if let Some(as_name) = &param.as_name {
        decl = decl.as_name(as_name.clone());
    }
    if let Some(desc) = &param.desc {
        decl = decl.desc(desc.clone());
    }
    if param.fail_fast {
        decl = decl.fail_fast();
    }
    if let Some(message) = &param.coerce_message {
        decl = decl.coerce_message(message.clone());
    }
    for (validator, message) in &param.messages {
        decl = decl.message(validator.clone(), message.clone());
    }
    Ok(decl)
}

fn dependency(def: &DependencyDef) -> Dependency {
    match def {
        DependencyDef::Present(name) => Dependency::present(name.clone()),
        DependencyDef::Equals { param, equals } => {
            let expected = equals.clone();
            Dependency::predicate(param.clone(), move |value| loosely_equal(value, &expected))
        }
        DependencyDef::OneOf { param, one_of } => {
            let allowed = one_of.clone();
            Dependency::predicate(param.clone(), move |value| allowed.iter().any(|a| loosely_equal(value, a)))
        }
    }
}

/// Uncoerced inputs arrive as strings, so `"1"` matches a declared `1`.
fn loosely_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(a), Value::Number(_) | Value::Bool(_)) => *a == expected.to_string(),
        _ => actual == expected,
    }
}

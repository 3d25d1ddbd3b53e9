use super::build::build_dispatcher;
use super::types::ApiDefinition;
use crate::dispatcher::Dispatcher;
use crate::runtime_config::RuntimeConfig;
use anyhow::Context;
use std::path::Path;
use tracing::info;

/// Parses an API definition. `.yaml`/`.yml` files are read as YAML,
/// anything else as JSON.
pub fn load_definition(path: impl AsRef<Path>) -> anyhow::Result<ApiDefinition> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read API definition {}", path.display()))?;
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let definition: ApiDefinition = if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("invalid YAML in {}", path.display()))?
    } else {
        serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))?
    };
    Ok(definition)
}

/// Loads and compiles a definition in one step.
pub fn load_dispatcher(path: impl AsRef<Path>, config: &RuntimeConfig) -> anyhow::Result<Dispatcher> {
    let path = path.as_ref();
    let definition = load_definition(path)?;
    let dispatcher = build_dispatcher(&definition, config)
        .with_context(|| format!("invalid API definition {}", path.display()))?;
    info!(
        path = %path.display(),
        api = definition.name.as_deref().unwrap_or("unnamed"),
        routes = dispatcher.router().len(),
        "API definition loaded"
    );
    Ok(dispatcher)
}

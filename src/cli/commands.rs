use crate::definition::load_dispatcher;
use crate::dispatcher::Dispatcher;
use crate::request::RequestParts;
use crate::router::RouteLookup;
use crate::runtime_config::RuntimeConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;
use serde_json::{json, Value};
use std::path::PathBuf;

/// Command-line interface for paramgate
#[derive(Parser, Debug)]
#[command(name = "paramgate", version)]
#[command(about = "Inspect routing and parameter validation of an API definition", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the compiled routing table
    Routes {
        /// Path to the API definition (YAML or JSON)
        #[arg(short, long, env = "PARAMGATE_DEFINITION")]
        definition: PathBuf,
    },
    /// Resolve a request line to a route
    Match {
        #[arg(short, long, env = "PARAMGATE_DEFINITION")]
        definition: PathBuf,

        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, optionally with a query string
        #[arg(short, long)]
        path: String,
    },
    /// Dispatch a request and print its coerced parameters
    Check {
        #[arg(short, long, env = "PARAMGATE_DEFINITION")]
        definition: PathBuf,

        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request path, optionally with a query string
        #[arg(short, long)]
        path: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,

        /// Request header as `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

/// Rendered result of one command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub body: Value,
    pub success: bool,
}

impl CommandOutput {
    fn ok(body: Value) -> Self {
        Self { body, success: true }
    }

    fn failed(body: Value) -> Self {
        Self { body, success: false }
    }
}

/// Parses process arguments, runs the command and prints its JSON result.
/// Returns the process exit code.
pub fn run_cli() -> anyhow::Result<i32> {
    let cli = Cli::parse();
    let output = execute(&cli, &RuntimeConfig::from_env())?;
    println!("{}", serde_json::to_string_pretty(&output.body)?);
    Ok(if output.success { 0 } else { 1 })
}

pub fn execute(cli: &Cli, config: &RuntimeConfig) -> anyhow::Result<CommandOutput> {
    match &cli.command {
        Commands::Routes { definition } => {
            let dispatcher = load_dispatcher(definition, config)?;
            Ok(CommandOutput::ok(json!(dispatcher.router().dump_routes())))
        }
        Commands::Match {
            definition,
            method,
            path,
        } => {
            let dispatcher = load_dispatcher(definition, config)?;
            let request = RequestParts::from_uri(parse_method(method)?, path);
            Ok(match_route(&dispatcher, &request))
        }
        Commands::Check {
            definition,
            method,
            path,
            body,
            headers,
        } => {
            let dispatcher = load_dispatcher(definition, config)?;
            let mut request = RequestParts::from_uri(parse_method(method)?, path);
            for header in headers {
                let (name, value) = header
                    .split_once(':')
                    .with_context(|| format!("header `{header}` is not `Name: value`"))?;
                request = request.with_header(name.trim(), value.trim());
            }
            if let Some(body) = body {
                let body: Value = serde_json::from_str(body).context("request body is not valid JSON")?;
                request = request.with_body(body);
            }
            Ok(check_request(&dispatcher, &request))
        }
    }
}

fn parse_method(method: &str) -> anyhow::Result<Method> {
    Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("invalid HTTP method `{method}`"))
}

fn match_route(dispatcher: &Dispatcher, request: &RequestParts) -> CommandOutput {
    match dispatcher.router().recognize(request) {
        RouteLookup::Found(found) => CommandOutput::ok(json!({
            "handler": found.handler(),
            "pattern": found.route.pattern().source(),
            "path_params": found.path_params_map(),
            "version": found.version,
        })),
        RouteLookup::MethodNotAllowed { allowed } => CommandOutput::failed(json!({
            "status": 405,
            "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>(),
        })),
        RouteLookup::Rejected(error) => CommandOutput::failed(json!({
            "status": error.status,
            "error": error.message,
        })),
        RouteLookup::NotFound => CommandOutput::failed(json!({ "status": 404 })),
    }
}

fn check_request(dispatcher: &Dispatcher, request: &RequestParts) -> CommandOutput {
    match dispatcher.dispatch(request) {
        Ok(dispatched) => CommandOutput::ok(json!({
            "handler": dispatched.handler(),
            "format": dispatched.format,
            "version": dispatched.version,
            "params": dispatched.params,
        })),
        Err(error) => {
            let headers: serde_json::Map<String, Value> = error
                .headers()
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect();
            CommandOutput::failed(json!({
                "status": error.status(),
                "headers": headers,
                "body": error.body(),
            }))
        }
    }
}

//! CLI command implementations
//!
//! Both commands read one JSON object of query parameters from stdin. A
//! failure is reported on stdout in the error envelope and also returned,
//! so the process exits non-zero.

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::compiler::QueryCompiler;
use crate::mapping::MapperRegistry;
use crate::query::{assemble, DynamicQuery};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let result = run_command(cli.command);
    if let Err(e) = &result {
        write_error(e.code_str(), e.message())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Parse => {
            let request = read_request()?;
            write_response(parse(&request)?)
        }
        Command::Compile { config, entity } => {
            let registry = load_registry(&config)?;
            let request = read_request()?;
            write_response(compile(&registry, &entity, &request)?)
        }
    }
}

/// Validates a request and returns the query as JSON
pub fn parse(request: &Value) -> CliResult<Value> {
    let query = to_query(request)?;
    Ok(serde_json::to_value(&query)?)
}

/// Validates and compiles a request against `entity`
pub fn compile(registry: &MapperRegistry, entity: &str, request: &Value) -> CliResult<Value> {
    let query = to_query(request)?;
    let compiled = QueryCompiler::for_entity(registry, entity)?.compile(&query)?;
    let fragment = compiled.to_sql();

    Ok(json!({
        "entity": entity,
        "count": compiled.is_count(),
        "sql": fragment.sql,
        "params": fragment.params,
        "pagination": query.offset_limit().map(|slice| slice.report()),
        "parameters": query.parameters(),
    }))
}

fn load_registry(path: &Path) -> CliResult<MapperRegistry> {
    MapperRegistry::load(path).map_err(|e| {
        CliError::config_error(format!("Failed to load {}: {}", path.display(), e))
    })
}

fn to_query(request: &Value) -> CliResult<DynamicQuery> {
    let params = request_params(request)?;
    Ok(assemble(params)?)
}

/// Flattens a request object into text parameters.
///
/// Numbers and booleans are accepted in their JSON text form so that
/// `{"limit": 10}` means the same as `{"limit": "10"}`.
fn request_params(request: &Value) -> CliResult<Vec<(String, String)>> {
    let object: &Map<String, Value> = request
        .as_object()
        .ok_or_else(|| CliError::invalid_request("Request must be a JSON object"))?;

    let mut params = Vec::with_capacity(object.len());
    for (key, value) in object {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(CliError::invalid_request(format!(
                    "Parameter '{}' must be a string, number or boolean",
                    key
                )))
            }
        };
        params.push((key.clone(), text));
    }
    Ok(params)
}

//! Parameter provider protocol.
//!
//! A request carrying [`PARAMS_HEADER`]`: true` asks a route handler for the
//! parameter sets it should be expanded to. A handler that understands the
//! request answers with `{ "params": [ {..}, .. ] }` and echoes the header.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::ParameterSet;

pub const PARAMS_HEADER: &str = "x-ssg-params";
pub const PARAMS_HEADER_VALUE: &str = "true";

/// Environment variable set on a spawned app so it can tell it is being pre-rendered
pub const SSG_CONTEXT_ENV: &str = "SSG_CONTEXT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamsPayload {
    pub params: Vec<ParameterSet>,
}

impl From<Vec<ParameterSet>> for ParamsPayload {
    fn from(params: Vec<ParameterSet>) -> Self {
        Self { params }
    }
}

impl From<ParameterSet> for ParamsPayload {
    fn from(params: ParameterSet) -> Self {
        Self {
            params: vec![params],
        }
    }
}

/// True when a header value marks the params protocol
pub fn is_marker(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case(PARAMS_HEADER_VALUE))
}

/// Parse the body of a marked response.
///
/// Numbers and booleans are accepted as values and rendered as strings.
/// Anything else (missing `params`, non-array, non-object entries, nested
/// values) is rejected so a route subtree is never silently dropped.
pub fn parse_params_payload(route: &str, body: &[u8]) -> Result<Vec<ParameterSet>> {
    let malformed = |reason: String| Error::MalformedParams {
        route: route.to_string(),
        reason,
    };

    let value: Value =
        serde_json::from_slice(body).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    let entries = match value.get("params") {
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            return Err(malformed(format!(
                "'params' must be an array, got {}",
                type_name(other)
            )));
        }
        None => return Err(malformed("missing 'params' field".to_string())),
    };

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let Value::Object(map) = entry else {
                return Err(malformed(format!(
                    "params[{}] must be an object, got {}",
                    i,
                    type_name(entry)
                )));
            };
            map.iter()
                .map(|(name, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        other => {
                            return Err(malformed(format!(
                                "params[{}].{} must be a string, got {}",
                                i,
                                name,
                                type_name(other)
                            )));
                        }
                    };
                    Ok((name.clone(), value))
                })
                .collect::<Result<ParameterSet>>()
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

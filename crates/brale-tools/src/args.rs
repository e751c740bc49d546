//! Argument extraction shared by the Brale tools.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use brale_client::{Idempotency, validate_idempotency_key};

use crate::error::ToolError;

/// Name of the optional argument carrying a caller-chosen idempotency key.
pub const IDEMPOTENCY_KEY_ARG: &str = "idempotency_key";

fn object(args: &Value) -> Result<&Map<String, Value>, ToolError> {
    args.as_object()
        .ok_or_else(|| ToolError::InvalidArguments("Expected object arguments".to_string()))
}

fn non_blank<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn missing_message(missing: &[&str]) -> String {
    match missing {
        [single] => format!("{single} is required"),
        [init @ .., last] => format!("{} and {last} are required", init.join(", ")),
        [] => String::new(),
    }
}

/// Extracts the named string arguments in order.
///
/// Every key must be present as a non-blank string; otherwise the error names
/// all the missing keys at once.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] naming the missing keys.
pub fn required_strs<'a, const N: usize>(
    args: &'a Value,
    keys: [&str; N],
) -> Result<[&'a str; N], ToolError> {
    let map = object(args)?;

    let missing: Vec<&str> = keys
        .iter()
        .copied()
        .filter(|key| non_blank(map, key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ToolError::InvalidArguments(missing_message(&missing)));
    }

    let values: Vec<&'a str> = keys
        .iter()
        .filter_map(|key| non_blank(map, key))
        .collect();
    values
        .try_into()
        .map_err(|_| ToolError::InvalidArguments(missing_message(&keys)))
}

/// A non-blank string argument, if present.
///
/// # Errors
///
/// Fails when the key is present with a non-string value.
pub fn optional_str(args: &Value, key: &str) -> Result<Option<String>, ToolError> {
    match object(args)?.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.trim().is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "{key} must be a string"
        ))),
    }
}

/// A boolean argument, if present.
///
/// # Errors
///
/// Fails when the key is present with a non-boolean value.
pub fn optional_bool(args: &Value, key: &str) -> Result<Option<bool>, ToolError> {
    match object(args)?.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(value)) => Ok(Some(*value)),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "{key} must be a boolean"
        ))),
    }
}

/// Decodes the arguments object into a request payload.
///
/// Keys the payload does not know, such as `account_id` or
/// `idempotency_key`, are ignored.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] when the payload does not decode.
pub fn payload<T: DeserializeOwned>(args: &Value, what: &str) -> Result<T, ToolError> {
    object(args)?;
    serde_json::from_value(args.clone())
        .map_err(|e| ToolError::InvalidArguments(format!("Invalid {what}: {e}")))
}

/// Resolves the idempotency key for a create call.
///
/// The caller's key when given, otherwise a freshly generated one. Resolved
/// here rather than in the dispatcher so the tool can report it.
///
/// # Errors
///
/// Fails when `idempotency_key` is present but not a string, or cannot be
/// sent as a header value.
pub fn idempotency_key(args: &Value) -> Result<String, ToolError> {
    let key = Idempotency::from_option(optional_str(args, IDEMPOTENCY_KEY_ARG)?).into_key();
    validate_idempotency_key(&key)
        .map_err(|e| ToolError::InvalidArguments(format!("{IDEMPOTENCY_KEY_ARG}: {e}")))?;
    Ok(key)
}

/// Pretty-printed JSON for tool output.
///
/// # Errors
///
/// Fails only if `value` cannot be serialized.
pub fn pretty<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

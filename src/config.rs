//! Option resolution for the `out` operation.
//!
//! Concourse hands the resource two untyped key/value maps: `source`
//! (pipeline-level configuration) and `params` (per-step options). This
//! module turns them into a typed [`ResolvedOptions`] record up front, so
//! the rest of the pipeline never touches raw JSON.
//!
//! Boolean options are *type-gated*: a value is honored only when it is an
//! actual JSON boolean. A string `"true"`, a number, or a null silently
//! falls back to the option's default — wrong-typed input is never an
//! error here.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ResourceError;

/// The resource input document, as read from stdin.
#[derive(Debug, Default, Deserialize)]
pub struct ResourceInput {
    /// Pipeline-level configuration (`webhook_url`)
    #[serde(default)]
    pub source: Map<String, Value>,
    /// Per-step options
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ResourceInput {
    /// Parse the raw stdin document.
    pub fn from_json(input: &str) -> Result<Self, ResourceError> {
        serde_json::from_str(input).map_err(ResourceError::Input)
    }
}

/// Typed, defaulted configuration for one `out` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    /// Google Chat incoming-webhook URL
    pub webhook_url: String,
    /// Literal message text, if any
    pub message: Option<String>,
    /// Workspace-relative path to a message file, if any
    pub message_file: Option<String>,
    /// Append the build URL line (default true)
    pub post_url: bool,
    /// Prepend the pipeline/job/build info lines (default true)
    pub post_info: bool,
    /// Let Chat open a new thread instead of pinning to the shared one
    /// (default false)
    pub create_thread: bool,
}

impl ResolvedOptions {
    /// Resolve the untyped `source`/`params` maps.
    ///
    /// Fails only when `webhook_url` is missing or empty; every other key
    /// is optional and unknown keys are ignored.
    pub fn resolve(input: &ResourceInput) -> Result<Self, ResourceError> {
        let webhook_url = match input.source.get("webhook_url") {
            Some(Value::String(url)) if !url.is_empty() => url.clone(),
            _ => return Err(ResourceError::MissingWebhookUrl),
        };

        Ok(Self {
            webhook_url,
            message: string_option(&input.params, "message"),
            message_file: string_option(&input.params, "message_file"),
            post_url: bool_option(&input.params, "post_url", true),
            post_info: bool_option(&input.params, "post_info", true),
            create_thread: bool_option(&input.params, "create_thread", false),
        })
    }
}

/// Type-gated boolean lookup: the value counts only if it is a JSON bool.
fn bool_option(params: &Map<String, Value>, key: &str, default: bool) -> bool {
    match params.get(key) {
        Some(Value::Bool(value)) => *value,
        _ => default,
    }
}

/// Type-gated string lookup, mapping absent and empty alike to `None`.
fn string_option(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
        _ => None,
    }
}

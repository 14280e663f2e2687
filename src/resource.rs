//! Resource operation dispatch and result mapping.
//!
//! Concourse drives every resource through three operations. `check` and
//! `in` are degenerate here (a notification resource tracks no versions)
//! and answer fixed documents; `out` runs the real pipeline:
//! resolve options → compose message → deliver → map the reply into the
//! metadata document, strictly in that order.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::build_env::BuildContext;
use crate::chat::{ChatClient, WebhookReply};
use crate::config::{ResolvedOptions, ResourceInput};
use crate::error::ResourceError;
use crate::message;

/// The three resource lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Check,
    In,
    Out,
}

/// One `{name, value}` pair in the emitted metadata sequence.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetadataEntry {
    pub name: String,
    pub value: Value,
}

impl MetadataEntry {
    fn new(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// The document emitted on stdout for `in` and `out`.
///
/// `version` is always the empty object: this resource has no versioned
/// state to track.
#[derive(Debug, Serialize)]
pub struct ResourceOutput {
    pub version: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<MetadataEntry>>,
}

/// Run one resource operation against the raw stdin document.
///
/// Returns the JSON document to print on stdout. Every failure mode maps
/// to a [`ResourceError`]; the binary converts those into the uniform
/// failure document.
pub async fn run(
    operation: Operation,
    input_json: &str,
    workspace: &Path,
) -> Result<Value, ResourceError> {
    match operation {
        // No versions to report, ever.
        Operation::Check => Ok(json!([])),
        Operation::In => Ok(serde_json::to_value(ResourceOutput {
            version: Map::new(),
            metadata: None,
        })?),
        Operation::Out => out(input_json, workspace).await,
    }
}

/// The `out` operation: compose and deliver the notification.
async fn out(input_json: &str, workspace: &Path) -> Result<Value, ResourceError> {
    let input = ResourceInput::from_json(input_json)?;
    let options = ResolvedOptions::resolve(&input)?;

    let ctx = BuildContext::from_env();
    let text = message::compose(&options, &ctx, workspace)?;

    let client = ChatClient::new();
    let (status, body) = client
        .deliver(&options.webhook_url, &text, options.create_thread)
        .await?;
    let reply = WebhookReply::from_json(&body)?;

    info!(status, "Posted to Google Chat");
    debug!(sent = %text, confirmed = reply.text.as_deref().unwrap_or(""), "Message delivered");

    Ok(serde_json::to_value(ResourceOutput {
        version: Map::new(),
        metadata: Some(success_metadata(&options, &ctx, &reply)),
    })?)
}

/// Build the fixed-order success metadata sequence.
///
/// The schema is stable: always the same entries in the same order, with
/// absent optional values carried as explicit nulls.
fn success_metadata(
    options: &ResolvedOptions,
    ctx: &BuildContext,
    reply: &WebhookReply,
) -> Vec<MetadataEntry> {
    let optional = |value: Option<&str>| {
        value.map_or(Value::Null, |inner| Value::String(inner.to_string()))
    };

    vec![
        MetadataEntry::new("status", json!("Posted")),
        MetadataEntry::new("message", optional(options.message.as_deref())),
        MetadataEntry::new("message_file", optional(options.message_file.as_deref())),
        MetadataEntry::new("post_url", json!(options.post_url)),
        MetadataEntry::new(
            "build_url",
            if options.post_url {
                json!(ctx.build_url())
            } else {
                Value::Null
            },
        ),
        MetadataEntry::new("create_thread", json!(options.create_thread)),
        MetadataEntry::new("pipeline", json!(ctx.pipeline)),
        MetadataEntry::new("job", json!(ctx.job)),
        MetadataEntry::new("build", json!(ctx.build)),
        MetadataEntry::new("post_info", json!(options.post_info)),
        MetadataEntry::new(
            "sender_name",
            optional(reply.sender.as_ref().and_then(|s| s.name.as_deref())),
        ),
        MetadataEntry::new(
            "sender_display_name",
            optional(reply.sender.as_ref().and_then(|s| s.display_name.as_deref())),
        ),
        MetadataEntry::new(
            "space_name",
            optional(reply.space.as_ref().and_then(|s| s.name.as_deref())),
        ),
        MetadataEntry::new(
            "space_display_name",
            optional(reply.space.as_ref().and_then(|s| s.display_name.as_deref())),
        ),
        MetadataEntry::new(
            "space_type",
            optional(reply.space.as_ref().and_then(|s| s.space_type.as_deref())),
        ),
        MetadataEntry::new(
            "thread_name",
            optional(reply.thread.as_ref().and_then(|t| t.name.as_deref())),
        ),
        MetadataEntry::new("create_time", optional(reply.create_time.as_deref())),
    ]
}

/// The uniform failure document.
///
/// Emitted on stdout for any error anywhere in the pipeline, so the
/// orchestrator always receives parsable output.
#[must_use]
pub fn failure_output() -> Value {
    json!({
        "version": {},
        "metadata": [{ "name": "status", "value": "Failed" }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::{ReplySender, ReplySpace, ReplyThread};

    fn options() -> ResolvedOptions {
        ResolvedOptions {
            webhook_url: "https://chat.test/post".to_string(),
            message: Some("hi".to_string()),
            message_file: None,
            post_url: true,
            post_info: true,
            create_thread: false,
        }
    }

    fn ctx() -> BuildContext {
        BuildContext {
            pipeline: "deploy".to_string(),
            job: "release".to_string(),
            build: "42".to_string(),
            team: "main".to_string(),
            atc_url: "https://ci.example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_check_reports_no_versions() {
        let output = run(Operation::Check, "{}", Path::new("")).await.unwrap();
        assert_eq!(output, json!([]));
    }

    #[tokio::test]
    async fn test_in_reports_empty_version() {
        let output = run(Operation::In, "{}", Path::new("")).await.unwrap();
        assert_eq!(output, json!({ "version": {} }));
    }

    #[tokio::test]
    async fn test_check_and_in_ignore_input_contents() {
        for garbage in ["{}", r#"{"source": {"unrelated": 1}}"#] {
            let check = run(Operation::Check, garbage, Path::new("")).await.unwrap();
            let fetch = run(Operation::In, garbage, Path::new("")).await.unwrap();
            assert_eq!(check, json!([]));
            assert_eq!(fetch, json!({ "version": {} }));
        }
    }

    #[test]
    fn test_metadata_schema_is_stable() {
        let metadata = success_metadata(&options(), &ctx(), &WebhookReply::default());
        let names: Vec<&str> = metadata
            .iter()
            .map(|entry| entry.name.as_str())
            .collect();

        assert_eq!(
            names,
            [
                "status",
                "message",
                "message_file",
                "post_url",
                "build_url",
                "create_thread",
                "pipeline",
                "job",
                "build",
                "post_info",
                "sender_name",
                "sender_display_name",
                "space_name",
                "space_display_name",
                "space_type",
                "thread_name",
                "create_time",
            ]
        );
    }

    #[test]
    fn test_absent_reply_fields_surface_as_nulls() {
        let metadata = success_metadata(&options(), &ctx(), &WebhookReply::default());

        assert_eq!(metadata[0].value, json!("Posted"));
        for entry in &metadata[10..] {
            assert_eq!(entry.value, Value::Null, "{} should be null", entry.name);
        }
    }

    #[test]
    fn test_reply_fields_round_trip_into_metadata() {
        let reply = WebhookReply {
            text: Some("hi".to_string()),
            sender: Some(ReplySender {
                name: Some("users/bot".to_string()),
                display_name: Some("CI Bot".to_string()),
            }),
            space: Some(ReplySpace {
                name: Some("spaces/X".to_string()),
                display_name: Some("Builds".to_string()),
                space_type: Some("ROOM".to_string()),
            }),
            thread: Some(ReplyThread {
                name: Some("spaces/X/threads/T".to_string()),
            }),
            create_time: Some("2024-05-01T12:00:00Z".to_string()),
        };

        let metadata = success_metadata(&options(), &ctx(), &reply);
        let tail: Vec<Value> = metadata[10..].iter().map(|e| e.value.clone()).collect();
        assert_eq!(
            tail,
            [
                json!("users/bot"),
                json!("CI Bot"),
                json!("spaces/X"),
                json!("Builds"),
                json!("ROOM"),
                json!("spaces/X/threads/T"),
                json!("2024-05-01T12:00:00Z"),
            ]
        );
    }

    #[test]
    fn test_build_url_entry_reflects_post_url_flag() {
        let silenced = ResolvedOptions {
            post_url: false,
            ..options()
        };
        let metadata = success_metadata(&silenced, &ctx(), &WebhookReply::default());
        assert_eq!(metadata[3].value, json!(false));
        assert_eq!(metadata[4].value, Value::Null);

        let metadata = success_metadata(&options(), &ctx(), &WebhookReply::default());
        assert_eq!(metadata[3].value, json!(true));
        assert_eq!(
            metadata[4].value,
            json!("https://ci.example.com/teams/main/pipelines/deploy/jobs/release/builds/42")
        );
    }

    #[test]
    fn test_failure_output_shape() {
        assert_eq!(
            failure_output(),
            json!({
                "version": {},
                "metadata": [{ "name": "status", "value": "Failed" }]
            })
        );
    }
}

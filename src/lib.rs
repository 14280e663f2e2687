//! Concourse resource for posting build notifications to Google Chat.
//!
//! The resource implements the standard Concourse lifecycle. `check` and
//! `in` are no-ops kept only to satisfy the protocol; `out` composes a
//! message from build metadata, optional literal text, and an optional
//! workspace file, posts it to a Chat incoming-webhook URL, and reports
//! delivery metadata back to the ATC.
//!
//! # Usage
//!
//! ```no_run
//! use std::path::Path;
//! use gchat_resource::{resource, Operation};
//!
//! # async fn example() -> Result<(), gchat_resource::ResourceError> {
//! let input = r#"{"source": {"webhook_url": "https://chat.googleapis.com/..."},
//!                 "params": {"message": "deployed"}}"#;
//! let output = resource::run(Operation::Out, input, Path::new("/tmp/build")).await?;
//! println!("{output}");
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! - `source.webhook_url` (required): the Chat incoming-webhook URL
//! - `params.message`: literal text to post
//! - `params.message_file`: workspace-relative file whose contents are appended
//! - `params.post_info` (default true): include pipeline/job/build lines
//! - `params.post_url` (default true): include the build's web URL
//! - `params.create_thread` (default false): open a new Chat thread per post
//!
//! Build identity comes from the `BUILD_*`/`ATC_EXTERNAL_URL` environment
//! variables Concourse sets for `out` scripts.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod build_env;
pub mod chat;
pub mod config;
pub mod error;
pub mod message;
pub mod resource;

pub use build_env::BuildContext;
pub use chat::{ChatClient, WebhookReply, THREAD_KEY};
pub use config::{ResolvedOptions, ResourceInput};
pub use error::ResourceError;
pub use resource::{failure_output, Operation};

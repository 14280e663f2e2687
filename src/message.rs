//! Message composition for the `out` operation.
//!
//! The posted text is an ordered concatenation of up to four optional
//! blocks, each supplying its own trailing line break:
//!
//! 1. build info (`Pipeline:`/`Job:`/`Build:` lines) when `post_info`
//! 2. the build URL when `post_url`
//! 3. the literal `message` param
//! 4. the contents of `message_file`, resolved against the workspace
//!
//! A message where every block is empty is still a valid (empty) message;
//! delivery proceeds regardless.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::build_env::BuildContext;
use crate::config::ResolvedOptions;
use crate::error::ResourceError;

/// Compose the full notification text.
///
/// Pure apart from the optional message-file read. A missing file is a
/// non-fatal diagnostic and contributes nothing; any other filesystem
/// error fails the run.
pub fn compose(
    options: &ResolvedOptions,
    ctx: &BuildContext,
    workspace: &Path,
) -> Result<String, ResourceError> {
    let mut text = String::new();

    if options.post_info {
        text.push_str(&format!(
            "Pipeline: {}\nJob: {}\nBuild: #{}\n",
            ctx.pipeline, ctx.job, ctx.build
        ));
    }

    if options.post_url {
        text.push_str(&ctx.build_url());
        text.push('\n');
    }

    if let Some(message) = options.message.as_deref() {
        if !message.is_empty() {
            text.push_str(message);
            text.push('\n');
        }
    }

    if let Some(file) = options.message_file.as_deref() {
        let path = workspace.join(file);
        if path.is_file() {
            let contents = fs::read_to_string(&path)?;
            debug!(path = %path.display(), bytes = contents.len(), "Read message file");
            text.push_str(strip_trailing_newline(&contents));
        } else {
            warn!(path = %path.display(), "Message file not found, skipping");
        }
    }

    Ok(text)
}

/// Drop exactly one trailing line break (`\n` or `\r\n`), if present.
fn strip_trailing_newline(contents: &str) -> &str {
    let contents = contents.strip_suffix('\n').unwrap_or(contents);
    contents.strip_suffix('\r').unwrap_or(contents)
}

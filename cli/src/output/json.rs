//! JSON output helpers.
//!
//! Provides the error-object formatter used by all `--json` code paths when
//! a command fails, and the JSON renderings of command results.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::services::cleanup::CleanupSummary;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Renders command results as pretty-printed JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// `{"path": "..."}` for a written template.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_template_path(path: &Path) -> Result<()> {
        let obj = serde_json::json!({ "path": path.display().to_string() });
        let out = serde_json::to_string_pretty(&obj).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }

    /// The cleanup summary as-is.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_cleanup(summary: &CleanupSummary) -> Result<()> {
        let out = serde_json::to_string_pretty(summary).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }

    /// `{"version": "..."}`.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(version: &str) -> Result<()> {
        let obj = serde_json::json!({ "version": version });
        let out = serde_json::to_string_pretty(&obj).context("JSON serialization failed")?;
        println!("{out}");
        Ok(())
    }
}

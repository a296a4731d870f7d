//! Application service: provisioning-template generation use-case.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::TemplateWriter;
use crate::domain::{TemplateInput, build_template};

/// Render the template and persist it, returning the written path.
///
/// # Errors
///
/// Returns an error if the document cannot be encoded or written.
pub fn generate_template(
    writer: &impl TemplateWriter,
    input: &TemplateInput,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let json = build_template(input)
        .and_then(|t| t.to_json())
        .context("rendering provisioning template")?;
    let path = writer.write_template(&json, output)?;
    tracing::info!(path = %path.display(), stage = %input.stage, "provisioning template written");
    Ok(path)
}

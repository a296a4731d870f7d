//! `jitp template`: render the provisioning template to a file.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::template::generate_template;
use crate::commands::TemplateArgs;
use crate::domain::TemplateInput;
use crate::domain::config::parse_attributes;
use crate::infra::config::template_settings;
use crate::infra::fs::LocalFs;
use crate::output::{JsonRenderer, Renderer};

/// Run `jitp template [--output PATH] [--no-policy] [--attribute KEY=VALUE]...`.
///
/// Prints only the written path so the command can be captured with
/// `$(jitp template)`.
///
/// # Errors
///
/// Returns an error if the environment is incomplete, an attribute is
/// malformed, or the file cannot be written.
pub fn run(app: &AppContext, args: &TemplateArgs) -> Result<()> {
    let settings = template_settings()?;
    let attributes = parse_attributes(&args.attributes)?;
    let input = TemplateInput::from_settings(&settings, attributes, !args.no_policy);

    let path = generate_template(&LocalFs, &input, args.output.as_deref())?;

    match app.renderer() {
        Renderer::Human(r) => r.render_template_path(&path),
        Renderer::Json(_) => JsonRenderer::render_template_path(&path),
    }
}

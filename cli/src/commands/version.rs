//! Version command

use anyhow::Result;

use crate::app::AppContext;
use crate::output::{JsonRenderer, Renderer};

/// Run the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    match app.renderer() {
        Renderer::Human(r) => r.render_version(version),
        Renderer::Json(_) => JsonRenderer::render_version(version)?,
    }
    Ok(())
}

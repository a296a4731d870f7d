//! `jitp delete [--yes]`: remove a device and its certificates.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::cleanup::delete_device;
use crate::infra::aws::AwsIot;
use crate::infra::config::cleanup_settings;
use crate::output::{JsonRenderer, Renderer, TerminalReporter};

/// Run `jitp delete`.
///
/// # Errors
///
/// Returns an error if the environment is incomplete, the prompt fails, or
/// any control-plane call fails.
pub async fn run(app: &AppContext) -> Result<()> {
    let settings = cleanup_settings()?;

    if !app.output.quiet {
        println!();
        println!(
            "This will permanently delete {} and every certificate attached to it.",
            settings.device_id
        );
        println!();
    }

    if !app.confirm("Continue?", false)? {
        if !app.is_json() {
            println!("Cancelled.");
        }
        return Ok(());
    }

    let control = AwsIot::connect(&settings.region, None).await;
    let reporter = TerminalReporter::new(&app.output);
    let summary = delete_device(&control, &reporter, &settings.device_id).await?;

    match app.renderer() {
        Renderer::Human(r) => r.render_cleanup(&summary),
        Renderer::Json(_) => JsonRenderer::render_cleanup(&summary)?,
    }
    Ok(())
}

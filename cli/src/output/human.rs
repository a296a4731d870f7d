//! Human-readable terminal renderer.

use std::io::Write as _;
use std::path::Path;

use anyhow::Result;

use crate::application::services::cleanup::CleanupSummary;
use crate::domain::SessionState;
use crate::output::OutputContext;

/// Renders command results as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Print the template path with no trailing newline, for `$(jitp template)`.
    ///
    /// Never suppressed: the path is the command's result.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be flushed.
    pub fn render_template_path(&self, path: &Path) -> Result<()> {
        print!("{}", path.display());
        std::io::stdout().flush()?;
        Ok(())
    }

    /// Render the outcome of `jitp delete`.
    pub fn render_cleanup(&self, summary: &CleanupSummary) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header(&format!("Deleted {}", summary.device_id));
        self.ctx
            .kv("Certificates:", &certificate_list(&summary.certificates));
        self.ctx
            .kv("Policies detached:", &summary.policies_detached.to_string());
    }

    /// Render how the device session ended.
    pub fn render_session_end(&self, state: SessionState) {
        if state == SessionState::Closed {
            self.ctx.info("Session closed");
        } else {
            self.ctx
                .warn(&format!("Event stream ended while {}", session_state_display(state)));
        }
    }

    /// Render the CLI version.
    pub fn render_version(&self, version: &str) {
        println!("jitp {version}");
    }
}

fn certificate_list(certificates: &[String]) -> String {
    if certificates.is_empty() {
        "none".to_string()
    } else {
        certificates.join(", ")
    }
}

fn session_state_display(state: SessionState) -> &'static str {
    match state {
        SessionState::Offline => "offline",
        SessionState::Connected => "associating",
        SessionState::Ready => "ready",
        SessionState::Closed => "closed",
    }
}

//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly. `ConsoleSink` does the same for
//! `MessageSink`.

use owo_colors::OwoColorize as _;

use crate::application::ports::{MessageSink, ProgressReporter};
use crate::output::OutputContext;

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `success()` prints `"  ✓ {message}"` (suppressed when `ctx.quiet`)
/// - `warn()` prints `"  ! {message}"` (suppressed when `ctx.quiet`)
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "→".style(self.ctx.styles.info));
        }
    }

    fn success(&self, message: &str) {
        self.ctx.success(message);
    }

    fn warn(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "!".style(self.ctx.styles.warning));
        }
    }
}

/// Prints messages received by the device session.
///
/// Human mode prints the topic followed by the pretty JSON body. JSON mode
/// prints one compact `{"topic":…,"payload":…}` line per message so the
/// stream can be piped into `jq`. Message bodies are data, so `--quiet`
/// does not suppress them.
pub struct ConsoleSink<'a> {
    ctx: &'a OutputContext,
    json: bool,
}

impl<'a> ConsoleSink<'a> {
    /// Create a sink printing in human or JSON-lines form.
    #[must_use]
    pub fn new(ctx: &'a OutputContext, json: bool) -> Self {
        Self { ctx, json }
    }
}

impl MessageSink for ConsoleSink<'_> {
    fn received(&self, topic: &str, body: &serde_json::Value) {
        if self.json {
            println!("{}", serde_json::json!({ "topic": topic, "payload": body }));
            return;
        }
        let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
        println!("  {} {}", "◆".style(self.ctx.styles.info), topic.style(self.ctx.styles.topic));
        for line in pretty.lines() {
            println!("    {line}");
        }
    }

    fn malformed(&self, topic: &str, error: &str) {
        tracing::warn!(topic, error, "dropping malformed message");
        self.ctx.error(&format!("malformed message on {topic}: {error}"));
    }
}

//! Command implementations

pub mod connect;
pub mod delete;
pub mod template;
pub mod version;

use std::path::PathBuf;

use clap::Args;

/// Arguments for the template command.
#[derive(Args)]
pub struct TemplateArgs {
    /// Write the template here instead of a fresh temporary file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Leave the policy resource out (ignored when JITP_CONNECT_POLICY is set)
    #[arg(long)]
    pub no_policy: bool,

    /// Extra static thing attribute, repeatable
    #[arg(short, long = "attribute", value_name = "KEY=VALUE")]
    pub attributes: Vec<String>,
}

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, OutputFlags};
use crate::commands;

/// AWS IoT just-in-time provisioning toolkit
#[derive(Parser)]
#[command(
    name = "jitp",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the provisioning template and print its path
    Template(commands::TemplateArgs),

    /// Connect as the device, associate it and publish test messages
    Connect,

    /// Delete the device and its certificates
    Delete(commands::DeleteArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            command,
        } = self;
        let yes = matches!(&command, Command::Delete(args) if args.yes);
        let app = AppContext::new(
            &OutputFlags {
                no_color,
                quiet,
                json,
            },
            yes,
        );

        match command {
            Command::Template(args) => commands::template::run(&app, &args),
            Command::Connect => commands::connect::run(&app).await,
            Command::Delete(_) => commands::delete::run(&app).await,
            Command::Version => commands::version::run(&app),
        }
    }
}

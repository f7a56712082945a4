//! The `parallexe` command line

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use parallexe_config::parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "parallexe")]
#[command(about = "Run shell commands across a fleet of hosts")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Inventory file path
    #[arg(short, long, global = true, default_value = "inventory.yaml")]
    pub inventory: PathBuf,

    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Only act on these hosts
    #[arg(long, global = true, value_delimiter = ',')]
    pub hosts: Vec<String>,

    /// Only act on hosts of these groups
    #[arg(long, global = true, value_delimiter = ',')]
    pub groups: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one command on every selected host in parallel
    Exec {
        /// Shell command
        command: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run commands in order, stopping at the first failing step
    Run {
        /// Shell commands, one per step
        #[arg(required = true)]
        commands: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ensure a line is present in (or absent from) a file
    LineInFile {
        /// File on the hosts
        path: String,

        /// Whole line to add or remove
        line: String,

        /// Remove the line instead of adding it
        #[arg(long)]
        absent: bool,
    },

    /// Copy a local file to the selected hosts
    Send {
        /// Local file
        source: PathBuf,

        /// Destination path on the hosts
        dest: String,

        /// Render the file with each host's variables
        #[arg(long)]
        template: bool,

        /// Owner for the destination file
        #[arg(long)]
        owner: Option<String>,

        /// Mode for the destination file
        #[arg(long)]
        mode: Option<String>,

        /// Leave existing destination files untouched
        #[arg(long)]
        ignore_if_exists: bool,
    },

    /// Print the variables resolved for a host
    Vars {
        /// Host as listed in the inventory
        host: String,
    },

    /// Validate the inventory without connecting
    Validate,
}

/// Pick the log filter: `--log-level`, then `RUST_LOG`, then the inventory
fn log_directive(
    flag: Option<&str>,
    env: Option<&str>,
    inventory: impl FnOnce() -> Option<String>,
) -> String {
    flag.or(env)
        .map(str::to_string)
        .or_else(inventory)
        .unwrap_or_else(|| "warn".to_string())
}

fn inventory_log_level(path: &Path) -> Option<String> {
    parser::parse_file(path).ok()?.settings.log_level
}

fn init_logging(global: &GlobalArgs) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = log_directive(global.log_level.as_deref(), env.as_deref(), || {
        inventory_log_level(&global.inventory)
    });

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    smol::block_on(async {
        let cli = Cli::parse();
        init_logging(&cli.global);

        let global = &cli.global;
        match cli.command {
            Commands::Exec { command, json } => commands::exec::run(global, &command, json).await,
            Commands::Run { commands, json } => commands::run::run(global, &commands, json).await,
            Commands::LineInFile { path, line, absent } => {
                commands::line_in_file::run(global, &path, &line, absent).await
            }
            Commands::Send {
                source,
                dest,
                template,
                owner,
                mode,
                ignore_if_exists,
            } => {
                let options = commands::send::SendOptions {
                    template,
                    owner,
                    mode,
                    ignore_if_exists,
                };
                commands::send::run(global, &source, &dest, options).await
            }
            Commands::Vars { host } => commands::vars::run(global, &host),
            Commands::Validate => commands::validate::run(global),
        }
    })
}

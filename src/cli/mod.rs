//! Command-line interface for procdesk
//!
//! This module defines the CLI structure using clap derive macros.
//! Each group of subcommands lives in its own submodule.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::Result;

mod init;
mod records;
mod shell;
mod suggest;

/// procdesk - defect and recruitment desk
///
/// Track customer defects and hiring candidates, each with follow-up tasks,
/// and let a generative text service suggest categories, tasks and design docs.
#[derive(Parser, Debug)]
#[command(name = "procdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (defaults to ./.procdesk.toml, then the user config dir)
    #[arg(long, global = true, env = "PROCDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a config file with every default (to --config, else ./.procdesk.toml)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Suggest a category for a defect description
    Categorize {
        /// Defect description
        #[arg(required = true)]
        description: String,
    },

    /// Suggest follow-up tasks for a defect or a candidate
    SuggestTasks {
        /// Workflow: defect or recruitment
        #[arg(long, default_value = "defect")]
        domain: String,

        /// Defect description, or candidate summary
        #[arg(required = true)]
        context: String,
    },

    /// Draft a markdown solution design document
    Doc {
        /// Process the document is about
        #[arg(long)]
        subject: Option<String>,

        /// Fields and journeys to cover
        #[arg(long)]
        details: Option<String>,
    },

    /// List records: defects or candidates
    List {
        /// defects or candidates
        kind: String,
    },

    /// Count records per status: defects or candidates
    Stats {
        /// defects or candidates
        kind: String,
    },

    /// Interactive editing session over an in-memory store
    Shell,
}

impl Cli {
    /// Name reported in the `command` field of JSON envelopes.
    pub fn command_name(&self) -> String {
        match &self.command {
            Commands::Init { .. } => "init".to_string(),
            Commands::Categorize { .. } => "categorize".to_string(),
            Commands::SuggestTasks { .. } => "suggest-tasks".to_string(),
            Commands::Doc { .. } => "doc".to_string(),
            Commands::List { kind } => format!("list {}", kind.trim()),
            Commands::Stats { kind } => format!("stats {}", kind.trim()),
            Commands::Shell => "shell".to_string(),
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        // Loaded per command: init must work without a readable config.
        let config = || load_config(self.config.as_deref());
        match self.command {
            Commands::Init { force } => init::run(init::InitOptions {
                path: self.config.clone(),
                force,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Categorize { description } => {
                suggest::run_categorize(suggest::CategorizeOptions {
                    description,
                    config: config()?,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
            Commands::SuggestTasks { domain, context } => {
                suggest::run_suggest_tasks(suggest::SuggestTasksOptions {
                    domain,
                    context,
                    config: config()?,
                    json: self.json,
                    quiet: self.quiet,
                })
            }
            Commands::Doc { subject, details } => suggest::run_doc(suggest::DocOptions {
                subject,
                details,
                config: config()?,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List { kind } => records::run_list(records::ListOptions {
                kind,
                config: config()?,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Stats { kind } => records::run_stats(records::StatsOptions {
                kind,
                config: config()?,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Shell => shell::run(shell::ShellOptions {
                config: config()?,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    Config::discover(explicit, &cwd)
}

/// Runtime for the suggestion calls. Commands themselves stay synchronous.
fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

//! procdesk init
//!
//! Writes a config file holding every default, ready for editing.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Config, CONFIG_FILENAME};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct InitOptions {
    /// Target file; `./.procdesk.toml` when absent.
    pub path: Option<PathBuf>,
    pub force: bool,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct InitReport {
    path: PathBuf,
    created: bool,
    overwritten: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let path = match options.path {
        Some(path) => path,
        None => std::env::current_dir()?.join(CONFIG_FILENAME),
    };

    let existed = path.exists();
    let write = !existed || options.force;
    if write {
        ensure_parent(&path)?;
        Config::default().save(&path)?;
        tracing::debug!(path = %path.display(), overwritten = existed, "wrote default config");
    }

    let header = match (write, existed) {
        (false, _) => "procdesk init: nothing to do",
        (true, true) => "procdesk init: config reset to defaults",
        (true, false) => "procdesk init: config created",
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("config", path.display().to_string());
    if !write {
        human.push_next_step("procdesk init --force");
    }
    human.push_next_step("export API_KEY=<key>");

    let report = InitReport {
        path,
        created: write && !existed,
        overwritten: write && existed,
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "init",
        &report,
        Some(&human),
    )
}

fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(std::fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

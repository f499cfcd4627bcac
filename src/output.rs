//! Result rendering for procdesk commands.
//!
//! Every command reports through [`emit_success`] or [`emit_error`]. With
//! `--json` both print one envelope on stdout, tagged by `status`:
//!
//! ```json
//! { "schema_version": "procdesk.v1", "command": "list defects",
//!   "status": "success", "data": { ... } }
//! ```
//!
//! Without it, a [`HumanOutput`] is printed on stdout and errors go to stderr.

use std::fmt;

use serde::Serialize;

use crate::error::{exit_codes, Error, JsonError, Result};

pub const SCHEMA_VERSION: &str = "procdesk.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

/// Plain-text report: a header line followed by optional bulleted sections.
#[derive(Debug, Clone, Default)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            ..Self::default()
        }
    }

    /// `key: value` line under "Summary". An empty value prints the key alone.
    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    /// Also carried in the JSON envelope.
    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    /// Also carried in the JSON envelope.
    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

impl fmt::Display for HumanOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;
        if !self.summary.is_empty() {
            f.write_str("\n\nSummary:")?;
            for (key, value) in &self.summary {
                match value.as_str() {
                    "" => write!(f, "\n- {key}")?,
                    value => write!(f, "\n- {key}: {value}")?,
                }
            }
        }
        write_section(f, "Details", &self.details)?;
        write_section(f, "Warnings", &self.warnings)?;
        write_section(f, "Next steps", &self.next_steps)
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    write!(f, "\n\n{title}:")?;
    items.iter().try_for_each(|item| write!(f, "\n- {item}"))
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    #[serde(flatten)]
    outcome: Outcome<'a, T>,
    #[serde(skip_serializing_if = "is_empty")]
    warnings: &'a [String],
    #[serde(skip_serializing_if = "is_empty")]
    next_steps: &'a [String],
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome<'a, T: Serialize> {
    Success { data: &'a T },
    Error { error: Failure },
}

#[derive(Serialize)]
struct Failure {
    kind: &'static str,
    message: String,
    code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        let JsonError {
            error,
            code,
            details,
        } = JsonError::from(err);
        Failure {
            kind: match code {
                exit_codes::USER_ERROR => "user_error",
                _ => "operation_failed",
            },
            message: error,
            code,
            details,
        }
    }
}

fn is_empty(items: &&[String]) -> bool {
    items.is_empty()
}

fn print_json<T: Serialize>(envelope: &Envelope<'_, T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope)?);
    Ok(())
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        return print_json(&Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            outcome: Outcome::Success { data },
            warnings: human.map_or(&[][..], |h| h.warnings.as_slice()),
            next_steps: human.map_or(&[][..], |h| h.next_steps.as_slice()),
        });
    }
    if let Some(human) = human.filter(|_| !options.quiet) {
        println!("{human}");
    }
    Ok(())
}

/// Report a failed command. Errors are never silenced by `--quiet`.
pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hints = recovery_hints(err);
    if json {
        let next_steps: Vec<String> = hints.iter().map(|hint| hint.to_string()).collect();
        return print_json(&Envelope::<()> {
            schema_version: SCHEMA_VERSION,
            command,
            outcome: Outcome::Error {
                error: Failure::from(err),
            },
            warnings: &[],
            next_steps: &next_steps,
        });
    }

    eprintln!("error: {err}");
    if let Some(hint) = hints.first() {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

/// What to try next, most useful first.
fn recovery_hints(err: &Error) -> &'static [&'static str] {
    match err {
        Error::InvalidConfig(_) => {
            &["fix the config file, or regenerate it with: procdesk init --force"]
        }
        Error::ConfigNotFound(_) => &["procdesk init", "omit --config to use defaults"],
        Error::RecordNotFound(_) => &["list"],
        Error::TaskNotFound(_) => &["show"],
        Error::NoDraft => &["new", "edit <id>"],
        _ => &[],
    }
}

//! procdesk categorize / suggest-tasks / doc

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::record::{DefectCategory, Domain};
use crate::suggest::{prompt, SuggestionClient};
use crate::task::{self, Task};

use super::runtime;

pub struct CategorizeOptions {
    pub description: String,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

pub struct SuggestTasksOptions {
    pub domain: String,
    pub context: String,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

pub struct DocOptions {
    pub subject: Option<String>,
    pub details: Option<String>,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct CategorizeReport {
    description: String,
    category: DefectCategory,
    credential: bool,
}

#[derive(Serialize)]
struct SuggestTasksReport {
    domain: Domain,
    tasks: Vec<Task>,
    credential: bool,
}

#[derive(Serialize)]
struct DocReport {
    subject: String,
    document: String,
    credential: bool,
}

pub fn run_categorize(options: CategorizeOptions) -> Result<()> {
    let client = SuggestionClient::from_config(&options.config)?;
    let category = runtime()?.block_on(client.classify(&options.description));

    let mut human = HumanOutput::new(format!("Category: {category}"));
    human.push_summary("description", options.description.trim());
    push_credential_warning(&mut human, &client, &options.config);

    let report = CategorizeReport {
        description: options.description,
        category,
        credential: client.has_credential(),
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "categorize",
        &report,
        Some(&human),
    )
}

pub fn run_suggest_tasks(options: SuggestTasksOptions) -> Result<()> {
    let domain: Domain = options.domain.parse()?;
    let client = SuggestionClient::from_config(&options.config)?;
    let drafts = runtime()?.block_on(client.suggest_tasks(&options.context, domain));
    let tasks = task::append_suggested(&[], &drafts, task::today());

    let header = match tasks.len() {
        0 => "No tasks suggested".to_string(),
        1 => "1 task suggested".to_string(),
        n => format!("{n} tasks suggested"),
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("domain", domain.to_string());
    for task in &tasks {
        human.push_detail(format_task(task));
    }
    push_credential_warning(&mut human, &client, &options.config);

    let report = SuggestTasksReport {
        domain,
        tasks,
        credential: client.has_credential(),
    };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "suggest-tasks",
        &report,
        Some(&human),
    )
}

pub fn run_doc(options: DocOptions) -> Result<()> {
    let subject = options
        .subject
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| prompt::DEFAULT_DOC_SUBJECT.to_string());
    let details = options
        .details
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| prompt::DEFAULT_DOC_DETAILS.to_string());

    let client = SuggestionClient::from_config(&options.config)?;
    let document = runtime()?.block_on(client.draft_document(&subject, &details));

    let report = DocReport {
        subject,
        document,
        credential: client.has_credential(),
    };
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };
    emit_success(output, "doc", &report, None)?;
    // The document is the output; no summary framing.
    if !output.json && !output.quiet {
        println!("{}", report.document);
    }
    Ok(())
}

pub(super) fn format_task(task: &Task) -> String {
    let title = if task.title.is_empty() {
        "(untitled)"
    } else {
        task.title.as_str()
    };
    let owner = if task.owner.is_empty() {
        "-"
    } else {
        task.owner.as_str()
    };
    format!(
        "{}  {}  owner={}  due={}  [{}]",
        task.id, title, owner, task.due_date, task.status
    )
}

fn push_credential_warning(human: &mut HumanOutput, client: &SuggestionClient, config: &Config) {
    if !client.has_credential() {
        human.push_warning(format!(
            "no API key in ${}; showing the fallback result",
            config.suggest.api_key_env
        ));
    }
}

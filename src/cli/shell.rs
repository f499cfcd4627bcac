//! procdesk shell
//!
//! Line-oriented editing session over seeded in-memory stores. One draft is
//! open at a time, either a defect or a candidate. Nothing is persisted.

use std::io::{BufRead, IsTerminal, Write};

use serde::Serialize;
use tokio::runtime::Runtime;

use crate::config::Config;
use crate::editor::{Editor, MergeOutcome, Refusal};
use crate::error::{Error, Result};
use crate::output::{emit_error, emit_success, HumanOutput, OutputOptions};
use crate::record::{Candidate, Defect, Domain, Record};
use crate::store::{CommitOutcome, RecordStore};
use crate::suggest::SuggestionClient;
use crate::task::{self, TaskField, TaskUpdate};

use super::records::{emit_list, emit_stats};
use super::runtime;
use super::suggest::format_task;

pub struct ShellOptions {
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

const HELP: &[&str] = &[
    "new defect|candidate          open a blank draft",
    "edit <id>                     open a draft of an existing record",
    "set <field> <value>           change a field of the draft",
    "task add                      append a blank task",
    "task set <task> <field> <v>   change title, owner, status or due of a task",
    "task rm <task>                remove a task",
    "categorize                    suggest a category from the description",
    "suggest                       append suggested tasks",
    "show                          print the draft",
    "save                          commit the draft",
    "cancel                        discard the draft",
    "list defects|candidates       list committed records",
    "stats defects|candidates      count records per status",
    "quit                          leave the shell",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    Quit,
}

pub fn run(options: ShellOptions) -> Result<()> {
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };
    let client = SuggestionClient::from_config(&options.config)?;
    let mut shell = Shell::new(&options.config, client, runtime()?, output);

    let stdin = std::io::stdin();
    let interactive = stdin.is_terminal() && !output.json;
    if interactive && !output.quiet {
        println!("procdesk shell. Type 'help' for commands.");
    }

    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match shell.execute(&line) {
            Ok(Step::Continue) => {}
            Ok(Step::Quit) => break,
            Err(err) => {
                let command = format!("shell {}", split_word(line.trim()).0);
                emit_error(&command, &err, output.json)?;
            }
        }
    }

    if let Some(id) = shell.draft_id() {
        tracing::debug!(id = %id, "unsaved draft dropped at exit");
        if !output.quiet && !output.json {
            eprintln!("warning: unsaved draft {id} discarded");
        }
    }
    Ok(())
}

pub(crate) struct Shell {
    defects: Editor<Defect>,
    candidates: Editor<Candidate>,
    active: Option<Domain>,
    client: SuggestionClient,
    runtime: Runtime,
    output: OutputOptions,
}

#[derive(Serialize)]
struct DraftReport<'a, R: Record> {
    domain: Domain,
    existing: bool,
    record: &'a R,
}

#[derive(Serialize)]
struct SavedReport {
    id: String,
    outcome: CommitOutcome,
}

#[derive(Serialize)]
struct TaskReport {
    id: String,
    task: String,
}

#[derive(Serialize)]
struct SuggestReport {
    issued: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    refused: Option<Refusal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<MergeOutcome>,
}

impl Shell {
    pub(crate) fn new(
        config: &Config,
        client: SuggestionClient,
        runtime: Runtime,
        output: OutputOptions,
    ) -> Self {
        Self {
            defects: Editor::new(RecordStore::<Defect>::defects(&config.records)),
            candidates: Editor::new(RecordStore::<Candidate>::candidates(&config.records)),
            active: None,
            client,
            runtime,
            output,
        }
    }

    pub(crate) fn execute(&mut self, line: &str) -> Result<Step> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Step::Continue);
        }
        let (command, rest) = split_word(line);
        match command {
            "new" => self.new_draft(rest)?,
            "edit" => self.edit(rest)?,
            "set" => self.set(rest)?,
            "task" => self.task(rest)?,
            "categorize" => self.categorize()?,
            "suggest" => self.suggest()?,
            "show" => self.show()?,
            "save" => self.save()?,
            "cancel" => self.cancel()?,
            "list" => self.list(rest)?,
            "stats" => self.stats(rest)?,
            "help" => self.help()?,
            "quit" | "exit" => return Ok(Step::Quit),
            other => {
                return Err(Error::InvalidArgument(format!(
                    "unknown command '{other}' (try 'help')"
                )))
            }
        }
        Ok(Step::Continue)
    }

    fn draft_id(&self) -> Option<String> {
        match self.active? {
            Domain::Defect => self.defects.draft().map(|draft| draft.record().id.clone()),
            Domain::Recruitment => self.candidates.draft().map(|draft| draft.record().id.clone()),
        }
    }

    fn active(&self) -> Result<Domain> {
        self.active.ok_or(Error::NoDraft)
    }

    fn new_draft(&mut self, rest: &str) -> Result<()> {
        if rest.is_empty() {
            return Err(Error::InvalidArgument("usage: new defect|candidate".to_string()));
        }
        let domain: Domain = rest.parse()?;
        self.open(domain, None)
    }

    fn edit(&mut self, rest: &str) -> Result<()> {
        let id = rest.trim();
        if id.is_empty() {
            return Err(Error::InvalidArgument("usage: edit <id>".to_string()));
        }
        let domain = if self.defects.store().contains(id) {
            Domain::Defect
        } else if self.candidates.store().contains(id) {
            Domain::Recruitment
        } else {
            return Err(Error::RecordNotFound(id.to_string()));
        };
        self.open(domain, Some(id))
    }

    fn open(&mut self, domain: Domain, existing: Option<&str>) -> Result<()> {
        let replaced = self.draft_id();
        match domain {
            Domain::Defect => {
                self.defects.open(existing)?;
                if self.candidates.draft().is_some() {
                    self.candidates.cancel()?;
                }
            }
            Domain::Recruitment => {
                self.candidates.open(existing)?;
                if self.defects.draft().is_some() {
                    self.defects.cancel()?;
                }
            }
        }
        self.active = Some(domain);

        let mut human = match domain {
            Domain::Defect => draft_output(&self.defects)?,
            Domain::Recruitment => draft_output(&self.candidates)?,
        };
        if let Some(id) = replaced {
            human.push_warning(format!("unsaved draft {id} discarded"));
        }
        human.push_next_step("set <field> <value>");
        self.emit_draft("open", &human)
    }

    fn set(&mut self, rest: &str) -> Result<()> {
        let (field, value) = split_word(rest);
        if field.is_empty() {
            return Err(Error::InvalidArgument("usage: set <field> <value>".to_string()));
        }
        match self.active()? {
            Domain::Defect => self.defects.draft_mut()?.set_field(field, value)?,
            Domain::Recruitment => self.candidates.draft_mut()?.set_field(field, value)?,
        }
        let human = match self.active()? {
            Domain::Defect => draft_output(&self.defects)?,
            Domain::Recruitment => draft_output(&self.candidates)?,
        };
        self.emit_draft("set", &human)
    }

    fn task(&mut self, rest: &str) -> Result<()> {
        let (action, rest) = split_word(rest);
        let domain = self.active()?;
        let report = match action {
            "add" => {
                let today = task::today();
                let id = match domain {
                    Domain::Defect => self.defects.draft_mut()?.add_task(today),
                    Domain::Recruitment => self.candidates.draft_mut()?.add_task(today),
                };
                TaskReport {
                    id,
                    task: "added".to_string(),
                }
            }
            "set" => {
                let (id, rest) = split_word(rest);
                let (field, value) = split_word(rest);
                if id.is_empty() || field.is_empty() {
                    return Err(Error::InvalidArgument(
                        "usage: task set <task> <field> <value>".to_string(),
                    ));
                }
                let change = TaskUpdate::parse(field.parse::<TaskField>()?, value)?;
                let found = match domain {
                    Domain::Defect => self.defects.draft_mut()?.update_task(id, &change),
                    Domain::Recruitment => self.candidates.draft_mut()?.update_task(id, &change),
                };
                if !found {
                    return Err(Error::TaskNotFound(id.to_string()));
                }
                TaskReport {
                    id: id.to_string(),
                    task: "updated".to_string(),
                }
            }
            "rm" | "remove" => {
                let id = rest.trim();
                if id.is_empty() {
                    return Err(Error::InvalidArgument("usage: task rm <task>".to_string()));
                }
                let found = match domain {
                    Domain::Defect => self.defects.draft_mut()?.remove_task(id),
                    Domain::Recruitment => self.candidates.draft_mut()?.remove_task(id),
                };
                if !found {
                    return Err(Error::TaskNotFound(id.to_string()));
                }
                TaskReport {
                    id: id.to_string(),
                    task: "removed".to_string(),
                }
            }
            _ => {
                return Err(Error::InvalidArgument(
                    "usage: task add | task set <task> <field> <value> | task rm <task>".to_string(),
                ))
            }
        };

        let human = HumanOutput::new(format!("Task {} {}", report.id, report.task));
        emit_success(self.output, &format!("shell task {action}"), &report, Some(&human))
    }

    fn categorize(&mut self) -> Result<()> {
        let outcome = match self.active()? {
            Domain::Defect => self
                .runtime
                .block_on(self.defects.suggest_category(&self.client))?,
            Domain::Recruitment => self
                .runtime
                .block_on(self.candidates.suggest_category(&self.client))?,
        };
        self.emit_suggestion("categorize", outcome)
    }

    fn suggest(&mut self) -> Result<()> {
        let outcome = match self.active()? {
            Domain::Defect => self
                .runtime
                .block_on(self.defects.suggest_tasks(&self.client))?,
            Domain::Recruitment => self
                .runtime
                .block_on(self.candidates.suggest_tasks(&self.client))?,
        };
        self.emit_suggestion("suggest", outcome)
    }

    fn show(&self) -> Result<()> {
        let human = match self.active()? {
            Domain::Defect => draft_output(&self.defects)?,
            Domain::Recruitment => draft_output(&self.candidates)?,
        };
        self.emit_draft("show", &human)
    }

    fn save(&mut self) -> Result<()> {
        let domain = self.active()?;
        let id = self.draft_id().ok_or(Error::NoDraft)?;
        let outcome = match domain {
            Domain::Defect => self.defects.save()?,
            Domain::Recruitment => self.candidates.save()?,
        };
        self.active = None;

        let verb = match outcome {
            CommitOutcome::Inserted => "created",
            CommitOutcome::Replaced { .. } => "updated",
        };
        let human = HumanOutput::new(format!("Saved {id} ({verb})"));
        emit_success(
            self.output,
            "shell save",
            &SavedReport { id, outcome },
            Some(&human),
        )
    }

    fn cancel(&mut self) -> Result<()> {
        let id = self.draft_id().ok_or(Error::NoDraft)?;
        match self.active()? {
            Domain::Defect => self.defects.cancel()?,
            Domain::Recruitment => self.candidates.cancel()?,
        }
        self.active = None;

        let human = HumanOutput::new(format!("Discarded draft {id}"));
        emit_success(
            self.output,
            "shell cancel",
            &serde_json::json!({ "id": id }),
            Some(&human),
        )
    }

    fn list(&self, rest: &str) -> Result<()> {
        match self.kind_or_active(rest)? {
            Domain::Defect => emit_list(self.output, self.defects.store()),
            Domain::Recruitment => emit_list(self.output, self.candidates.store()),
        }
    }

    fn stats(&self, rest: &str) -> Result<()> {
        match self.kind_or_active(rest)? {
            Domain::Defect => emit_stats(self.output, self.defects.store()),
            Domain::Recruitment => emit_stats(self.output, self.candidates.store()),
        }
    }

    fn help(&self) -> Result<()> {
        let mut human = HumanOutput::new("Commands");
        for line in HELP {
            human.push_detail(*line);
        }
        human.push_detail(format!("defect fields: {}", Defect::FIELDS.join(", ")));
        human.push_detail(format!("candidate fields: {}", Candidate::FIELDS.join(", ")));
        emit_success(self.output, "shell help", &HELP, Some(&human))
    }

    fn kind_or_active(&self, rest: &str) -> Result<Domain> {
        let rest = rest.trim();
        if rest.is_empty() {
            return self.active.ok_or_else(|| {
                Error::InvalidArgument("expected defects or candidates".to_string())
            });
        }
        rest.parse()
    }

    fn emit_draft(&self, action: &str, human: &HumanOutput) -> Result<()> {
        let command = format!("shell {action}");
        match self.active()? {
            Domain::Defect => emit_success(self.output, &command, &draft_report(&self.defects)?, Some(human)),
            Domain::Recruitment => {
                emit_success(self.output, &command, &draft_report(&self.candidates)?, Some(human))
            }
        }
    }

    fn emit_suggestion(
        &self,
        action: &str,
        outcome: std::result::Result<MergeOutcome, Refusal>,
    ) -> Result<()> {
        let mut human;
        let report = match outcome {
            Ok(outcome) => {
                human = HumanOutput::new(match &outcome {
                    MergeOutcome::Category { category } => format!("Category set to {category}"),
                    MergeOutcome::Tasks { added: 0 } => "No tasks suggested".to_string(),
                    MergeOutcome::Tasks { added } => format!("Added {added} suggested task(s)"),
                    MergeOutcome::Stale => "Suggestion arrived for a closed draft; dropped".to_string(),
                });
                SuggestReport {
                    issued: true,
                    refused: None,
                    outcome: Some(outcome),
                }
            }
            Err(refusal) => {
                human = HumanOutput::new("Suggestion not requested");
                human.push_warning(match refusal {
                    Refusal::Busy => "a suggestion of this kind is already running",
                    Refusal::BlankInput => "the description is empty",
                    Refusal::Unsupported => "candidates have no category",
                });
                SuggestReport {
                    issued: false,
                    refused: Some(refusal),
                    outcome: None,
                }
            }
        };
        if !self.client.has_credential() && report.issued {
            human.push_warning("no API key configured; fallback applied");
        }
        emit_success(self.output, &format!("shell {action}"), &report, Some(&human))
    }
}

fn draft_report<R: Record>(editor: &Editor<R>) -> Result<DraftReport<'_, R>> {
    let draft = editor.draft().ok_or(Error::NoDraft)?;
    Ok(DraftReport {
        domain: R::DOMAIN,
        existing: draft.is_existing(),
        record: draft.record(),
    })
}

fn draft_output<R: Record>(editor: &Editor<R>) -> Result<HumanOutput> {
    let draft = editor.draft().ok_or(Error::NoDraft)?;
    let record = draft.record();
    let state = if draft.is_existing() { "editing" } else { "new" };
    let mut human = HumanOutput::new(format!("{} ({state})", record.id()));

    if let serde_json::Value::Object(fields) = serde_json::to_value(record)? {
        for (key, value) in fields {
            if key == "id" || key == "relatedTasks" {
                continue;
            }
            let value = match value {
                serde_json::Value::String(text) => text,
                serde_json::Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string).unwrap_or_else(|| item.to_string()))
                    .collect::<Vec<_>>()
                    .join(", "),
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            human.push_summary(key, value);
        }
    }
    for task in record.tasks() {
        human.push_detail(format_task(task));
    }
    Ok(human)
}

/// Split off the first whitespace-delimited word. The remainder keeps its
/// inner spacing so free-text values survive.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(at) => (&input[..at], input[at..].trim()),
        None => (input, ""),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::config::TasksConfig;
    use crate::record::{DefectCategory, DefectStatus};
    use crate::suggest::{CompletionBackend, CompletionRequest, SuggestError};

    struct CannedBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionBackend for CannedBackend {
        fn has_credential(&self) -> bool {
            true
        }

        async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, SuggestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if request.prompt.starts_with("Categorize") {
                Ok(r#"{"category": "Workflow Bugs"}"#.to_string())
            } else {
                Ok(r#"[{"title": "Reproduce", "owner": "QA", "dueDateOffset": 1},
                       {"title": "Fix"}]"#
                    .to_string())
            }
        }
    }

    fn shell() -> (Shell, Arc<CannedBackend>) {
        let backend = Arc::new(CannedBackend {
            calls: AtomicUsize::new(0),
        });
        let client = SuggestionClient::new(
            backend.clone(),
            "test-model",
            Duration::from_secs(5),
            TasksConfig::default(),
        );
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        let output = OutputOptions {
            json: false,
            quiet: true,
        };
        (Shell::new(&Config::default(), client, runtime, output), backend)
    }

    #[test]
    fn split_word_keeps_inner_spacing() {
        assert_eq!(split_word("set description  a  b "), ("set", "description  a  b"));
        assert_eq!(split_word("save"), ("save", ""));
        assert_eq!(split_word(""), ("", ""));
    }

    #[test]
    fn new_defect_is_saved_first() {
        let (mut shell, backend) = shell();
        for line in [
            "new defect",
            "set customer Acme",
            "set description Order total ignores discount",
            "categorize",
            "suggest",
            "save",
        ] {
            assert_eq!(shell.execute(line).expect(line), Step::Continue);
        }

        let store = shell.defects.store();
        assert_eq!(store.len(), 3);
        let saved = &store.records()[0];
        assert_eq!(saved.id, "DEF-003");
        assert_eq!(saved.category, DefectCategory::Workflow);
        assert_eq!(saved.related_tasks.len(), 2);
        assert_eq!(saved.related_tasks[1].owner, "Unassigned");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert!(shell.draft_id().is_none());
    }

    #[test]
    fn blank_description_skips_the_service() {
        let (mut shell, backend) = shell();
        shell.execute("new defect").expect("new");
        shell.execute("categorize").expect("categorize");
        shell.execute("suggest").expect("suggest");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn edit_then_cancel_leaves_store_alone() {
        let (mut shell, _) = shell();
        shell.execute("edit DEF-001").expect("edit");
        shell.execute("set status Resolved").expect("set");
        shell.execute("cancel").expect("cancel");
        let record = shell.defects.store().get("DEF-001").expect("record");
        assert_eq!(record.status, DefectStatus::New);
    }

    #[test]
    fn opening_a_candidate_drops_the_defect_draft() {
        let (mut shell, _) = shell();
        shell.execute("new defect").expect("new defect");
        shell.execute("new candidate").expect("new candidate");
        assert!(shell.defects.draft().is_none());
        assert_eq!(shell.draft_id().as_deref(), Some("CAN-103"));
    }

    #[test]
    fn task_commands_edit_the_draft() {
        let (mut shell, _) = shell();
        shell.execute("edit CAN-101").expect("edit");
        shell.execute("task add").expect("add");
        let id = shell
            .candidates
            .draft()
            .and_then(|draft| draft.record().related_tasks.last())
            .map(|task| task.id.clone())
            .expect("task");
        shell
            .execute(&format!("task set {id} title Call references"))
            .expect("set");
        let title = shell
            .candidates
            .draft()
            .and_then(|draft| draft.record().related_tasks.last())
            .map(|task| task.title.clone())
            .expect("task");
        assert_eq!(title, "Call references");

        match shell.execute("task rm missing") {
            Err(Error::TaskNotFound(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn commands_without_draft_fail() {
        let (mut shell, _) = shell();
        for line in ["set name Ada", "save", "cancel", "show", "task add"] {
            match shell.execute(line) {
                Err(Error::NoDraft) => {}
                other => panic!("{line}: unexpected result: {other:?}"),
            }
        }
        match shell.execute("edit NOPE-1") {
            Err(Error::RecordNotFound(_)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(shell.execute("quit").expect("quit"), Step::Quit);
    }
}

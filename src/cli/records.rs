//! procdesk list / stats

use serde::Serialize;

use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::record::{Candidate, Defect, Domain, Record};
use crate::store::{RecordStore, StatusCount};

pub struct ListOptions {
    pub kind: String,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatsOptions {
    pub kind: String,
    pub config: Config,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ListReport<'a, R: Record> {
    domain: Domain,
    total: usize,
    records: &'a [R],
}

#[derive(Serialize)]
struct StatsReport {
    domain: Domain,
    total: usize,
    statuses: Vec<StatusCount>,
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };
    match options.kind.parse::<Domain>()? {
        Domain::Defect => emit_list(
            output,
            &RecordStore::<Defect>::defects(&options.config.records),
        ),
        Domain::Recruitment => emit_list(
            output,
            &RecordStore::<Candidate>::candidates(&options.config.records),
        ),
    }
}

pub fn run_stats(options: StatsOptions) -> Result<()> {
    let output = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };
    match options.kind.parse::<Domain>()? {
        Domain::Defect => emit_stats(
            output,
            &RecordStore::<Defect>::defects(&options.config.records),
        ),
        Domain::Recruitment => emit_stats(
            output,
            &RecordStore::<Candidate>::candidates(&options.config.records),
        ),
    }
}

pub(super) fn emit_list<R: Record>(output: OutputOptions, store: &RecordStore<R>) -> Result<()> {
    let noun = plural(R::DOMAIN);
    let mut human = HumanOutput::new(format!("{} {noun}", store.len()));
    for record in store.records() {
        human.push_detail(record.summary());
    }
    if store.is_empty() {
        human.push_next_step("procdesk shell, then: new");
    }

    let report = ListReport {
        domain: R::DOMAIN,
        total: store.len(),
        records: store.records(),
    };
    emit_success(output, &format!("list {noun}"), &report, Some(&human))
}

pub(super) fn emit_stats<R: Record>(output: OutputOptions, store: &RecordStore<R>) -> Result<()> {
    let noun = plural(R::DOMAIN);
    let statuses = store.status_breakdown();
    let mut human = HumanOutput::new(format!("{} stats", capitalize(noun)));
    human.push_summary("total", store.len().to_string());
    for count in &statuses {
        human.push_summary(count.status, count.count.to_string());
    }

    let report = StatsReport {
        domain: R::DOMAIN,
        total: store.len(),
        statuses,
    };
    emit_success(output, &format!("stats {noun}"), &report, Some(&human))
}

fn plural(domain: Domain) -> &'static str {
    match domain {
        Domain::Defect => "defects",
        Domain::Recruitment => "candidates",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

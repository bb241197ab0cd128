//! GitHub Actions workflow commands and step files.

use crate::logging::escape_data;
use anyhow::Context;
use ghmirror_core::redact::sanitize;
use ghmirror_core::sync_engine_types::RunSummary;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Runner facts read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionsEnv {
    pub enabled: bool,
    pub step_summary: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub runner_temp: Option<PathBuf>,
}

impl ActionsEnv {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let path = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };
        let enabled = lookup("GITHUB_ACTIONS").is_some_and(|value| value.eq_ignore_ascii_case("true"));
        if !enabled {
            return Self::default();
        }
        Self {
            enabled,
            step_summary: path("GITHUB_STEP_SUMMARY"),
            output: path("GITHUB_OUTPUT"),
            runner_temp: path("RUNNER_TEMP"),
        }
    }

    /// Registers every secret with the runner's log masker.
    pub fn mask(&self, secrets: &[&str]) {
        print!("{}", self.mask_commands(secrets));
    }

    fn mask_commands(&self, secrets: &[&str]) -> String {
        if !self.enabled {
            return String::new();
        }
        secrets
            .iter()
            .filter(|secret| !secret.is_empty())
            .map(|secret| format!("::add-mask::{}\n", escape_data(secret)))
            .collect()
    }

    pub fn group(&self, title: &str) {
        if self.enabled {
            println!("::group::{}", escape_data(title));
        }
    }

    pub fn end_group(&self) {
        if self.enabled {
            println!("::endgroup::");
        }
    }

    /// Appends the step summary and outputs, whichever files the runner set.
    pub fn publish(&self, summary: &RunSummary) -> anyhow::Result<()> {
        if let Some(path) = &self.step_summary {
            append(path, &step_summary_markdown(summary)).context("write step summary")?;
        }
        if let Some(path) = &self.output {
            append(path, &output_lines(summary)).context("write step outputs")?;
        }
        Ok(())
    }
}

fn append(path: &Path, text: &str) -> anyhow::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    file.write_all(text.as_bytes())
        .with_context(|| format!("append to {}", path.display()))
}

pub fn step_summary_markdown(summary: &RunSummary) -> String {
    let mut out = String::from("## Repository mirror\n\n| | count |\n|---|---:|\n");
    for (label, count) in [
        ("Total", summary.total),
        ("Successful", summary.successful),
        ("Failed", summary.failed),
        ("Created", summary.created),
        ("Updated", summary.updated),
        ("Archived", summary.archived),
    ] {
        out.push_str(&format!("| {label} | {count} |\n"));
    }
    if !summary.failures.is_empty() {
        out.push_str("\n### Failures\n\n| repository | error |\n|---|---|\n");
        for failure in &summary.failures {
            out.push_str(&format!(
                "| {} | {} |\n",
                failure.repo,
                table_cell(&failure.error)
            ));
        }
    }
    out
}

pub fn output_lines(summary: &RunSummary) -> String {
    [
        ("total", summary.total),
        ("successful", summary.successful),
        ("failed", summary.failed),
        ("created", summary.created),
        ("updated", summary.updated),
        ("archived", summary.archived),
    ]
    .iter()
    .map(|(key, value)| format!("{key}={value}\n"))
    .collect()
}

fn table_cell(text: &str) -> String {
    sanitize(text)
        .replace('|', "\\|")
        .replace(['\r', '\n'], " ")
}

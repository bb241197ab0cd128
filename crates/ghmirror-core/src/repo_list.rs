use crate::model::{RepoRef, RepoRefError, RepoSyncSpec, Visibility};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum RepoListError {
    #[error("read repo list {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse repo list")]
    Parse(#[from] serde_yaml_ng::Error),
    #[error("repos[{index}].{field}")]
    Entry {
        index: usize,
        field: &'static str,
        #[source]
        source: RepoRefError,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawRepoList {
    #[serde(default)]
    repos: Option<Vec<RawRepoEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawRepoEntry {
    source: String,
    target: String,
    #[serde(default)]
    visibility: Option<Visibility>,
    #[serde(default)]
    disable_github_actions: Option<bool>,
    #[serde(default)]
    archive_after_sync: Option<bool>,
}

impl RawRepoEntry {
    fn into_spec(self, index: usize) -> Result<RepoSyncSpec, RepoListError> {
        let source: RepoRef = self.source.parse().map_err(|source| RepoListError::Entry {
            index,
            field: "source",
            source,
        })?;
        let target: RepoRef = self.target.parse().map_err(|source| RepoListError::Entry {
            index,
            field: "target",
            source,
        })?;
        Ok(RepoSyncSpec {
            source,
            target,
            visibility: self.visibility.unwrap_or_default(),
            disable_actions: self.disable_github_actions.unwrap_or(true),
            archive_after_sync: self.archive_after_sync.unwrap_or(false),
        })
    }
}

pub fn load_repo_list(path: &Path) -> Result<Vec<RepoSyncSpec>, RepoListError> {
    let data = fs::read_to_string(path).map_err(|source| RepoListError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_repo_list(&data)
}

/// Parses the `repos:` document; an absent or null list is empty.
pub fn parse_repo_list(data: &str) -> Result<Vec<RepoSyncSpec>, RepoListError> {
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let raw: Option<RawRepoList> = serde_yaml_ng::from_str(data)?;
    raw.unwrap_or_default()
        .repos
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_spec(index))
        .collect()
}

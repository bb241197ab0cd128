use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::instance_url::derive_instance_url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoRefError {
    #[error("repository reference `{0}` must be in owner/name form")]
    Malformed(String),
}

/// An `owner/name` pair identifying a repository on one host.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoRef {
    type Err = RepoRefError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let Some((owner, name)) = trimmed.split_once('/') else {
            return Err(RepoRefError::Malformed(value.to_string()));
        };
        let owner = owner.trim();
        let name = name.trim();
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(RepoRefError::Malformed(value.to_string()));
        }
        Ok(Self::new(owner, name))
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
    Internal,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Public => "public",
            Visibility::Internal => "internal",
        }
    }

    /// Internal repositories are created private and then exposed to the
    /// enterprise through the `visibility` field.
    pub fn is_private(&self) -> bool {
        matches!(self, Visibility::Private | Visibility::Internal)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the repository list, with every default already applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoSyncSpec {
    pub source: RepoRef,
    pub target: RepoRef,
    pub visibility: Visibility,
    pub disable_actions: bool,
    pub archive_after_sync: bool,
}

/// Connection details for one side of the mirror.
#[derive(Clone)]
pub struct HostConfig {
    pub api_url: String,
    pub instance_url: String,
    pub token: String,
}

impl HostConfig {
    pub fn new(api_url: &str, token: impl Into<String>) -> Self {
        let api_url = api_url.trim_end_matches('/').to_string();
        let instance_url = derive_instance_url(&api_url);
        Self {
            api_url,
            instance_url,
            token: token.into(),
        }
    }

    pub fn clone_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/{}/{}.git",
            self.instance_url.trim_end_matches('/'),
            repo.owner,
            repo.name
        )
    }
}

impl fmt::Debug for HostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostConfig")
            .field("api_url", &self.api_url)
            .field("instance_url", &self.instance_url)
            .field("token", &"***")
            .finish()
    }
}

/// Repository metadata as last read from a host.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RemoteRepoState {
    pub visibility: Visibility,
    pub description: Option<String>,
    pub archived: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateRepoRequest {
    pub owner: String,
    pub name: String,
    pub private: bool,
    pub visibility: Visibility,
    pub description: String,
}

/// Fields of a repository update; `None` leaves the field untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RepoPatch {
    pub visibility: Option<Visibility>,
    pub description: Option<String>,
    pub archived: Option<bool>,
}

impl RepoPatch {
    pub fn is_empty(&self) -> bool {
        self.visibility.is_none() && self.description.is_none() && self.archived.is_none()
    }
}

/// Knobs that apply to every repository of a run.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SyncSettings {
    pub overwrite_visibility: bool,
    pub force_push: bool,
}

use ghmirror_core::model::{CreateRepoRequest, RemoteRepoState, RepoPatch, Visibility};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub(crate) struct RepoItem {
    #[serde(default)]
    pub(crate) private: bool,
    pub(crate) visibility: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) archived: Option<bool>,
}

impl RepoItem {
    pub(crate) fn into_state(self) -> RemoteRepoState {
        let visibility = self
            .visibility
            .as_deref()
            .and_then(parse_visibility)
            .unwrap_or(if self.private {
                Visibility::Private
            } else {
                Visibility::Public
            });
        RemoteRepoState {
            visibility,
            description: self.description,
            archived: self.archived.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserItem {
    pub(crate) login: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRepoBody<'a> {
    pub(crate) name: &'a str,
    pub(crate) private: bool,
    pub(crate) visibility: &'static str,
    pub(crate) description: &'a str,
}

impl<'a> From<&'a CreateRepoRequest> for CreateRepoBody<'a> {
    fn from(request: &'a CreateRepoRequest) -> Self {
        Self {
            name: &request.name,
            private: request.private,
            visibility: request.visibility.as_str(),
            description: &request.description,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateRepoBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) visibility: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) archived: Option<bool>,
}

impl<'a> From<&'a RepoPatch> for UpdateRepoBody<'a> {
    fn from(patch: &'a RepoPatch) -> Self {
        Self {
            visibility: patch.visibility.map(|value| value.as_str()),
            description: patch.description.as_deref(),
            archived: patch.archived,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ActionsPermissionBody {
    pub(crate) enabled: bool,
}

fn parse_visibility(value: &str) -> Option<Visibility> {
    match value.to_ascii_lowercase().as_str() {
        "private" => Some(Visibility::Private),
        "public" => Some(Visibility::Public),
        "internal" => Some(Visibility::Internal),
        _ => None,
    }
}

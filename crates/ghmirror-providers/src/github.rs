use crate::github_models::{
    ActionsPermissionBody, CreateRepoBody, RepoItem, UpdateRepoBody, UserItem,
};
use crate::http::{send, send_allow_statuses};
use anyhow::Context;
use ghmirror_core::host::{HostFuture, RepoHost};
use ghmirror_core::model::{CreateRepoRequest, HostConfig, RemoteRepoState, RepoPatch, RepoRef};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use tracing::debug;

const USER_AGENT: &str = "ghmirror";
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// Repository API of GitHub.com or a GitHub Enterprise Server instance.
pub struct GitHubHost {
    client: Client,
    api_url: String,
    token: String,
}

impl GitHubHost {
    pub fn new(config: &HostConfig) -> anyhow::Result<Self> {
        let client = Client::builder().build().context("build HTTP client")?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.api_url))
            .header("User-Agent", USER_AGENT)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(&self.token)
    }

    async fn fetch_repo(&self, repo: &RepoRef) -> anyhow::Result<Option<RemoteRepoState>> {
        let path = repo_path(repo);
        let label = format!("GET {path}");
        let response = send_allow_statuses(
            self.request(Method::GET, &path),
            &label,
            &[StatusCode::NOT_FOUND],
        )
        .await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(repo = %repo, "repository not found");
            return Ok(None);
        }
        let item: RepoItem = response
            .json()
            .await
            .with_context(|| format!("decode {label} response"))?;
        Ok(Some(item.into_state()))
    }

    /// Organization endpoint first; a 404 there means the owner may be the
    /// token's own user account.
    async fn create(&self, request: &CreateRepoRequest) -> anyhow::Result<RemoteRepoState> {
        let body = CreateRepoBody::from(request);
        let org_path = format!("/orgs/{}/repos", request.owner);
        let label = format!("POST {org_path}");
        let response = send_allow_statuses(
            self.request(Method::POST, &org_path).json(&body),
            &label,
            &[StatusCode::NOT_FOUND],
        )
        .await?;
        let (response, label) = if response.status() == StatusCode::NOT_FOUND {
            let login = self.authenticated_login().await?;
            if !login.eq_ignore_ascii_case(&request.owner) {
                anyhow::bail!(
                    "{label} returned 404: organization {} not found and the token belongs to {login}",
                    request.owner
                );
            }
            debug!(owner = %request.owner, "creating repository under authenticated user");
            let label = "POST /user/repos".to_string();
            let response = send(self.request(Method::POST, "/user/repos").json(&body), &label).await?;
            (response, label)
        } else {
            (response, label)
        };
        let item: RepoItem = response
            .json()
            .await
            .with_context(|| format!("decode {label} response"))?;
        Ok(item.into_state())
    }

    async fn authenticated_login(&self) -> anyhow::Result<String> {
        let label = "GET /user";
        let response = send(self.request(Method::GET, "/user"), label).await?;
        let user: UserItem = response
            .json()
            .await
            .with_context(|| format!("decode {label} response"))?;
        Ok(user.login)
    }

    async fn update(&self, repo: &RepoRef, patch: &RepoPatch) -> anyhow::Result<RemoteRepoState> {
        let path = repo_path(repo);
        let label = format!("PATCH {path}");
        let response = send(
            self.request(Method::PATCH, &path)
                .json(&UpdateRepoBody::from(patch)),
            &label,
        )
        .await?;
        let item: RepoItem = response
            .json()
            .await
            .with_context(|| format!("decode {label} response"))?;
        Ok(item.into_state())
    }

    async fn set_actions(&self, repo: &RepoRef, enabled: bool) -> anyhow::Result<()> {
        let path = format!("{}/actions/permissions", repo_path(repo));
        let label = format!("PUT {path}");
        send(
            self.request(Method::PUT, &path)
                .json(&ActionsPermissionBody { enabled }),
            &label,
        )
        .await?;
        Ok(())
    }
}

impl RepoHost for GitHubHost {
    fn get_repo<'a>(&'a self, repo: &'a RepoRef) -> HostFuture<'a, Option<RemoteRepoState>> {
        Box::pin(self.fetch_repo(repo))
    }

    fn create_repo<'a>(
        &'a self,
        request: &'a CreateRepoRequest,
    ) -> HostFuture<'a, RemoteRepoState> {
        Box::pin(self.create(request))
    }

    fn update_repo<'a>(
        &'a self,
        repo: &'a RepoRef,
        patch: &'a RepoPatch,
    ) -> HostFuture<'a, RemoteRepoState> {
        Box::pin(self.update(repo, patch))
    }

    fn set_actions_enabled<'a>(&'a self, repo: &'a RepoRef, enabled: bool) -> HostFuture<'a, ()> {
        Box::pin(self.set_actions(repo, enabled))
    }
}

fn repo_path(repo: &RepoRef) -> String {
    format!("/repos/{}/{}", repo.owner, repo.name)
}

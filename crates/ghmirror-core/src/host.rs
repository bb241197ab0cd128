use crate::model::{CreateRepoRequest, RemoteRepoState, RepoPatch, RepoRef};
use std::future::Future;
use std::pin::Pin;

pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = anyhow::Result<T>> + 'a>>;

/// Repository API of one GitHub-compatible host.
///
/// Every call is attempted once; callers decide whether a failure is fatal.
pub trait RepoHost {
    /// `Ok(None)` is the not-found signal; any other failure is an error.
    fn get_repo<'a>(&'a self, repo: &'a RepoRef) -> HostFuture<'a, Option<RemoteRepoState>>;

    fn create_repo<'a>(&'a self, request: &'a CreateRepoRequest) -> HostFuture<'a, RemoteRepoState>;

    fn update_repo<'a>(
        &'a self,
        repo: &'a RepoRef,
        patch: &'a RepoPatch,
    ) -> HostFuture<'a, RemoteRepoState>;

    fn set_actions_enabled<'a>(&'a self, repo: &'a RepoRef, enabled: bool) -> HostFuture<'a, ()>;
}

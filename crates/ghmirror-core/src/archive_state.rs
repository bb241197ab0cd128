use crate::host::RepoHost;
use crate::model::{RepoPatch, RepoRef};
use crate::redact::sanitize_error;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UnarchiveResult {
    pub was_archived: bool,
}

/// Reads the current archive flag and lifts it so the transfer can push.
pub async fn ensure_unarchived(host: &dyn RepoHost, repo: &RepoRef) -> UnarchiveResult {
    let state = match host.get_repo(repo).await {
        Ok(Some(state)) => state,
        Ok(None) => {
            warn!(repo = %repo, "repository not found while checking archive state");
            return UnarchiveResult::default();
        }
        Err(err) => {
            warn!(repo = %repo, error = %sanitize_error(&err), "failed to read archive state");
            return UnarchiveResult::default();
        }
    };
    if !state.archived {
        return UnarchiveResult::default();
    }

    match set_archived(host, repo, false).await {
        Ok(()) => {
            info!(repo = %repo, "unarchived repository for sync");
            UnarchiveResult { was_archived: true }
        }
        Err(err) => {
            warn!(repo = %repo, error = %sanitize_error(&err), "failed to unarchive repository");
            UnarchiveResult::default()
        }
    }
}

/// Marks `repo` archived. Only called after a successful transfer.
pub async fn archive(host: &dyn RepoHost, repo: &RepoRef) -> bool {
    match set_archived(host, repo, true).await {
        Ok(()) => {
            info!(repo = %repo, "archived repository");
            true
        }
        Err(err) => {
            warn!(repo = %repo, error = %sanitize_error(&err), "failed to archive repository");
            false
        }
    }
}

async fn set_archived(host: &dyn RepoHost, repo: &RepoRef, archived: bool) -> anyhow::Result<()> {
    let patch = RepoPatch {
        archived: Some(archived),
        ..RepoPatch::default()
    };
    host.update_repo(repo, &patch).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RemoteRepoState, Visibility};
    use crate::test_support::{FakeHost, HostCall};

    fn repo() -> RepoRef {
        RepoRef::new("mirror", "tool")
    }

    fn archived_state() -> RemoteRepoState {
        RemoteRepoState {
            visibility: Visibility::Private,
            description: None,
            archived: true,
        }
    }

    #[tokio::test]
    async fn archived_repository_is_unarchived() {
        let host = FakeHost::default().with_repo(&repo(), archived_state());
        let result = ensure_unarchived(&host, &repo()).await;
        assert!(result.was_archived);
        assert!(!host.state(&repo()).unwrap().archived);
        assert_eq!(
            host.calls()[1],
            HostCall::Update(
                repo(),
                RepoPatch {
                    archived: Some(false),
                    ..RepoPatch::default()
                }
            )
        );
    }

    #[tokio::test]
    async fn active_repository_is_left_alone() {
        let host = FakeHost::default().with_repo(&repo(), RemoteRepoState::default());
        let result = ensure_unarchived(&host, &repo()).await;
        assert!(!result.was_archived);
        assert_eq!(host.calls(), vec![HostCall::Get(repo())]);
    }

    #[tokio::test]
    async fn unarchive_failures_are_swallowed() {
        let host = FakeHost::default()
            .with_repo(&repo(), archived_state())
            .failing_update(&repo());
        assert!(!ensure_unarchived(&host, &repo()).await.was_archived);

        let host = FakeHost::default().failing_get(&repo());
        assert!(!ensure_unarchived(&host, &repo()).await.was_archived);
    }

    #[tokio::test]
    async fn archive_sets_flag_and_reports_failure() {
        let host = FakeHost::default().with_repo(&repo(), RemoteRepoState::default());
        assert!(archive(&host, &repo()).await);
        assert!(host.state(&repo()).unwrap().archived);

        let host = FakeHost::default()
            .with_repo(&repo(), RemoteRepoState::default())
            .failing_update(&repo());
        assert!(!archive(&host, &repo()).await);
    }
}

use crate::host::RepoHost;
use crate::model::RepoRef;
use crate::redact::sanitize_error;
use tracing::{info, warn};

/// Turns GitHub Actions off for `repo`. Failures are logged and reported as
/// `false`; they never stop a sync.
pub async fn disable_actions(host: &dyn RepoHost, repo: &RepoRef) -> bool {
    match host.set_actions_enabled(repo, false).await {
        Ok(()) => {
            info!(repo = %repo, "disabled GitHub Actions");
            true
        }
        Err(err) => {
            warn!(repo = %repo, error = %sanitize_error(&err), "failed to disable GitHub Actions");
            false
        }
    }
}

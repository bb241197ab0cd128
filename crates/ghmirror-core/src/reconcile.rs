use crate::host::RepoHost;
use crate::model::{CreateRepoRequest, RepoPatch, RepoRef, Visibility};
use anyhow::Context;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReconcileResult {
    pub created: bool,
    pub visibility_updated: bool,
    pub description_updated: bool,
}

/// Makes sure `repo` exists on `host` with the wanted visibility and
/// description.
///
/// Query and creation failures are returned; a failed metadata update is
/// logged and the staged flags are kept.
pub async fn ensure_repository(
    host: &dyn RepoHost,
    repo: &RepoRef,
    visibility: Visibility,
    description: &str,
    overwrite_visibility: bool,
) -> anyhow::Result<ReconcileResult> {
    let current = host
        .get_repo(repo)
        .await
        .with_context(|| format!("query target repository {repo}"))?;

    let Some(current) = current else {
        let request = CreateRepoRequest {
            owner: repo.owner.clone(),
            name: repo.name.clone(),
            private: visibility.is_private(),
            visibility,
            description: description.to_string(),
        };
        host.create_repo(&request)
            .await
            .with_context(|| format!("create target repository {repo}"))?;
        info!(repo = %repo, visibility = %visibility, "created target repository");
        return Ok(ReconcileResult {
            created: true,
            ..ReconcileResult::default()
        });
    };

    let mut result = ReconcileResult::default();
    let mut patch = RepoPatch::default();
    if overwrite_visibility && current.visibility != visibility {
        patch.visibility = Some(visibility);
        result.visibility_updated = true;
    }
    if !descriptions_match(current.description.as_deref(), Some(description)) {
        patch.description = Some(description.to_string());
        result.description_updated = true;
    }
    if patch.is_empty() {
        return Ok(result);
    }

    match host.update_repo(repo, &patch).await {
        Ok(_) => {
            info!(
                repo = %repo,
                visibility_updated = result.visibility_updated,
                description_updated = result.description_updated,
                "updated target repository metadata"
            );
            Ok(result)
        }
        Err(err) => {
            warn!(repo = %repo, error = %crate::redact::sanitize_error(&err), "failed to update target repository metadata");
            Ok(result)
        }
    }
}

/// Exact comparison where a missing description equals an empty one.
pub fn descriptions_match(current: Option<&str>, desired: Option<&str>) -> bool {
    current.unwrap_or_default() == desired.unwrap_or_default()
}

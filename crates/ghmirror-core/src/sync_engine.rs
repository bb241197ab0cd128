use crate::actions_permission::disable_actions;
use crate::archive_state::{archive, ensure_unarchived};
use crate::host::RepoHost;
use crate::mirror_transfer::{MirrorTransport, TransferRequest, transfer};
use crate::model::{HostConfig, RepoRef, RepoSyncSpec, SyncSettings};
use crate::reconcile::ensure_repository;
use crate::redact::sanitize_error;
use crate::sync_engine_types::{RunSummary, SyncOutcome, SyncProgress, SyncProgressReporter};
use anyhow::Context;
use std::path::PathBuf;
use tempfile::TempDir;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// One side of the mirror: its API client and connection details.
#[derive(Clone, Copy)]
pub struct HostBinding<'a> {
    pub api: &'a dyn RepoHost,
    pub config: &'a HostConfig,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct SourceDetails {
    description: String,
}

pub struct SyncEngine<'a> {
    source: HostBinding<'a>,
    target: HostBinding<'a>,
    transport: &'a dyn MirrorTransport,
    settings: SyncSettings,
    scratch_root: Option<PathBuf>,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        source: HostBinding<'a>,
        target: HostBinding<'a>,
        transport: &'a dyn MirrorTransport,
        settings: SyncSettings,
    ) -> Self {
        Self {
            source,
            target,
            transport,
            settings,
            scratch_root: None,
        }
    }

    /// Creates scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: PathBuf) -> Self {
        self.scratch_root = Some(root);
        self
    }

    /// Syncs every repository in list order, one at a time.
    pub async fn run(
        &self,
        specs: &[RepoSyncSpec],
        progress: Option<&SyncProgressReporter<'_>>,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let total = specs.len();
        info!(repos = total, "starting mirror run");
        for (index, spec) in specs.iter().enumerate() {
            if let Some(progress) = progress {
                progress(SyncProgress::Starting { index, total, spec });
            }
            let outcome = self.sync_repository(spec).await;
            if let Some(progress) = progress {
                progress(SyncProgress::Finished {
                    index,
                    total,
                    outcome: &outcome,
                });
            }
            summary.record(&outcome);
        }
        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "mirror run finished"
        );
        summary
    }

    /// Runs the full workflow for one repository. Always returns an outcome;
    /// fatal step failures become `success == false` with a redacted error.
    pub async fn sync_repository(&self, spec: &RepoSyncSpec) -> SyncOutcome {
        let span = info_span!("sync_repo", source = %spec.source, target = %spec.target);
        async {
            let mut outcome = SyncOutcome::pending(spec);
            match self.run_steps(spec, &mut outcome).await {
                Ok(()) => {
                    outcome.success = true;
                    info!("repository synced");
                }
                Err(err) => {
                    let message = sanitize_error(&err);
                    error!(error = %message, "repository sync failed");
                    outcome.error = Some(message);
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn run_steps(&self, spec: &RepoSyncSpec, outcome: &mut SyncOutcome) -> anyhow::Result<()> {
        let source = self.fetch_source_details(&spec.source).await;

        let reconciled = ensure_repository(
            self.target.api,
            &spec.target,
            spec.visibility,
            &source.description,
            self.settings.overwrite_visibility,
        )
        .await?;
        outcome.created = reconciled.created;
        outcome.visibility_updated = reconciled.visibility_updated;
        outcome.description_updated = reconciled.description_updated;

        if spec.archive_after_sync {
            let unarchived = ensure_unarchived(self.target.api, &spec.target).await;
            debug!(was_archived = unarchived.was_archived, "checked archive state");
        }

        if spec.disable_actions {
            disable_actions(self.target.api, &spec.target).await;
        }

        self.transfer_in_scratch(spec).await?;

        if spec.archive_after_sync {
            outcome.archived = archive(self.target.api, &spec.target).await;
        }
        Ok(())
    }

    async fn fetch_source_details(&self, repo: &RepoRef) -> SourceDetails {
        match self.source.api.get_repo(repo).await {
            Ok(Some(state)) => SourceDetails {
                description: state.description.unwrap_or_default(),
            },
            Ok(None) => {
                warn!(repo = %repo, "source repository not found; using empty description");
                SourceDetails::default()
            }
            Err(err) => {
                warn!(
                    repo = %repo,
                    error = %sanitize_error(&err),
                    "failed to read source repository; using empty description"
                );
                SourceDetails::default()
            }
        }
    }

    async fn transfer_in_scratch(&self, spec: &RepoSyncSpec) -> anyhow::Result<()> {
        let scratch = self.scratch_dir()?;
        let source_url = self.source.config.clone_url(&spec.source);
        let target_url = self.target.config.clone_url(&spec.target);
        let request = TransferRequest {
            source_url: &source_url,
            source_token: &self.source.config.token,
            target_url: &target_url,
            target_token: &self.target.config.token,
            work_dir: scratch.path(),
            force_push: self.settings.force_push,
        };
        let result = transfer(self.transport, request).await;

        let path = scratch.path().to_path_buf();
        if let Err(err) = scratch.close() {
            warn!(path = %path.display(), error = %err, "failed to remove scratch directory");
        }
        result.with_context(|| format!("mirror {} to {}", spec.source, spec.target))
    }

    fn scratch_dir(&self) -> anyhow::Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("ghmirror-");
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.context("create scratch directory")
    }
}

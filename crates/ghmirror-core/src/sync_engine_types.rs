use crate::model::{RepoRef, RepoSyncSpec};

/// Result of one repository's sync. Flags describe what changed on the
/// target, even when a later step failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SyncOutcome {
    pub source: RepoRef,
    pub target: RepoRef,
    pub success: bool,
    pub created: bool,
    pub visibility_updated: bool,
    pub description_updated: bool,
    pub archived: bool,
    pub error: Option<String>,
}

impl SyncOutcome {
    pub(crate) fn pending(spec: &RepoSyncSpec) -> Self {
        Self {
            source: spec.source.clone(),
            target: spec.target.clone(),
            success: false,
            created: false,
            visibility_updated: false,
            description_updated: false,
            archived: false,
            error: None,
        }
    }

    pub fn updated(&self) -> bool {
        self.visibility_updated || self.description_updated
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoFailure {
    pub repo: RepoRef,
    pub error: String,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub total: u32,
    pub successful: u32,
    pub failed: u32,
    pub created: u32,
    pub updated: u32,
    pub visibility_updated: u32,
    pub description_updated: u32,
    pub archived: u32,
    pub failures: Vec<RepoFailure>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &SyncOutcome) {
        self.total += 1;
        if outcome.success {
            self.successful += 1;
        } else {
            self.failed += 1;
            self.failures.push(RepoFailure {
                repo: outcome.target.clone(),
                error: outcome
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        self.created += u32::from(outcome.created);
        self.updated += u32::from(outcome.updated());
        self.visibility_updated += u32::from(outcome.visibility_updated);
        self.description_updated += u32::from(outcome.description_updated);
        self.archived += u32::from(outcome.archived);
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[derive(Clone, Copy, Debug)]
pub enum SyncProgress<'a> {
    Starting {
        index: usize,
        total: usize,
        spec: &'a RepoSyncSpec,
    },
    Finished {
        index: usize,
        total: usize,
        outcome: &'a SyncOutcome,
    },
}

pub type SyncProgressReporter<'a> = dyn Fn(SyncProgress<'_>) + 'a;

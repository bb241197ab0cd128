use crate::host::{HostFuture, RepoHost};
use crate::mirror_transfer::{MirrorTransport, TransportFuture};
use crate::model::{CreateRepoRequest, RemoteRepoState, RepoPatch, RepoRef};
use anyhow::anyhow;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum HostCall {
    Get(RepoRef),
    Create(CreateRepoRequest),
    Update(RepoRef, RepoPatch),
    SetActions(RepoRef, bool),
}

/// In-memory host that records every call in order.
#[derive(Default)]
pub(crate) struct FakeHost {
    repos: RefCell<HashMap<RepoRef, RemoteRepoState>>,
    calls: RefCell<Vec<HostCall>>,
    fail_get: HashSet<RepoRef>,
    fail_update: HashSet<RepoRef>,
    fail_create: bool,
    fail_actions: bool,
}

impl FakeHost {
    pub(crate) fn with_repo(self, repo: &RepoRef, state: RemoteRepoState) -> Self {
        self.repos.borrow_mut().insert(repo.clone(), state);
        self
    }

    pub(crate) fn failing_get(mut self, repo: &RepoRef) -> Self {
        self.fail_get.insert(repo.clone());
        self
    }

    pub(crate) fn failing_update(mut self, repo: &RepoRef) -> Self {
        self.fail_update.insert(repo.clone());
        self
    }

    pub(crate) fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub(crate) fn failing_actions(mut self) -> Self {
        self.fail_actions = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub(crate) fn state(&self, repo: &RepoRef) -> Option<RemoteRepoState> {
        self.repos.borrow().get(repo).cloned()
    }

    fn record(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl RepoHost for FakeHost {
    fn get_repo<'a>(&'a self, repo: &'a RepoRef) -> HostFuture<'a, Option<RemoteRepoState>> {
        Box::pin(async move {
            self.record(HostCall::Get(repo.clone()));
            if self.fail_get.contains(repo) {
                return Err(anyhow!("GET /repos/{repo} returned 500"));
            }
            Ok(self.state(repo))
        })
    }

    fn create_repo<'a>(
        &'a self,
        request: &'a CreateRepoRequest,
    ) -> HostFuture<'a, RemoteRepoState> {
        Box::pin(async move {
            self.record(HostCall::Create(request.clone()));
            if self.fail_create {
                return Err(anyhow!("POST /orgs/{}/repos returned 422", request.owner));
            }
            let state = RemoteRepoState {
                visibility: request.visibility,
                description: Some(request.description.clone()),
                archived: false,
            };
            self.repos.borrow_mut().insert(
                RepoRef::new(request.owner.clone(), request.name.clone()),
                state.clone(),
            );
            Ok(state)
        })
    }

    fn update_repo<'a>(
        &'a self,
        repo: &'a RepoRef,
        patch: &'a RepoPatch,
    ) -> HostFuture<'a, RemoteRepoState> {
        Box::pin(async move {
            self.record(HostCall::Update(repo.clone(), patch.clone()));
            if self.fail_update.contains(repo) {
                return Err(anyhow!("PATCH /repos/{repo} returned 403"));
            }
            let mut repos = self.repos.borrow_mut();
            let state = repos
                .get_mut(repo)
                .ok_or_else(|| anyhow!("PATCH /repos/{repo} returned 404"))?;
            if let Some(visibility) = patch.visibility {
                state.visibility = visibility;
            }
            if let Some(description) = &patch.description {
                state.description = Some(description.clone());
            }
            if let Some(archived) = patch.archived {
                state.archived = archived;
            }
            Ok(state.clone())
        })
    }

    fn set_actions_enabled<'a>(&'a self, repo: &'a RepoRef, enabled: bool) -> HostFuture<'a, ()> {
        Box::pin(async move {
            self.record(HostCall::SetActions(repo.clone(), enabled));
            if self.fail_actions {
                return Err(anyhow!("PUT /repos/{repo}/actions/permissions returned 403"));
            }
            Ok(())
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum TransportCall {
    Clone {
        url: String,
        dest: PathBuf,
    },
    Push {
        repo_dir: PathBuf,
        url: String,
        refspec: String,
        force: bool,
    },
}

/// Transport that records calls; failures echo the authenticated URL the
/// way git does.
#[derive(Default)]
pub(crate) struct FakeTransport {
    calls: RefCell<Vec<TransportCall>>,
    fail_clone: bool,
    fail_refspec: Option<String>,
}

impl FakeTransport {
    pub(crate) fn failing_clone(mut self) -> Self {
        self.fail_clone = true;
        self
    }

    pub(crate) fn failing_push(mut self, refspec: &str) -> Self {
        self.fail_refspec = Some(refspec.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<TransportCall> {
        self.calls.borrow().clone()
    }
}

impl MirrorTransport for FakeTransport {
    fn mirror_clone<'a>(&'a self, url: &'a str, dest: &'a Path) -> TransportFuture<'a> {
        Box::pin(async move {
            self.calls.borrow_mut().push(TransportCall::Clone {
                url: url.to_string(),
                dest: dest.to_path_buf(),
            });
            if self.fail_clone {
                return Err(anyhow!("fatal: repository '{url}' not found"));
            }
            std::fs::create_dir_all(dest)?;
            Ok(())
        })
    }

    fn push_refspec<'a>(
        &'a self,
        repo_dir: &'a Path,
        url: &'a str,
        refspec: &'a str,
        force: bool,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            self.calls.borrow_mut().push(TransportCall::Push {
                repo_dir: repo_dir.to_path_buf(),
                url: url.to_string(),
                refspec: refspec.to_string(),
                force,
            });
            if self.fail_refspec.as_deref() == Some(refspec) {
                return Err(anyhow!("error: failed to push some refs to '{url}'"));
            }
            Ok(())
        })
    }
}

struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Runs `f` under a subscriber that counts WARN events.
pub(crate) fn count_warnings<T>(f: impl FnOnce() -> T) -> (T, usize) {
    let counter = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(counter.clone()));
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, counter.load(Ordering::SeqCst))
}

//! Mirror clone and push between two authenticated remotes.
//!
//! Remote URLs carry the access token inline, so every failure leaving this
//! module has been through [`sanitize`](crate::redact::sanitize) first.

use crate::redact::{sanitize, sanitize_error};
use anyhow::{Context, bail};
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

pub const BRANCH_REFSPEC: &str = "refs/heads/*:refs/heads/*";
pub const TAG_REFSPEC: &str = "refs/tags/*:refs/tags/*";
const MIRROR_DIR_NAME: &str = "mirror.git";

pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>;

/// The two git primitives a mirror needs.
pub trait MirrorTransport {
    fn mirror_clone<'a>(&'a self, url: &'a str, dest: &'a Path) -> TransportFuture<'a>;

    fn push_refspec<'a>(
        &'a self,
        repo_dir: &'a Path,
        url: &'a str,
        refspec: &'a str,
        force: bool,
    ) -> TransportFuture<'a>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("remote URL `{0}` has no scheme separator")]
    InvalidUrl(String),
    #[error("mirror clone failed: {0}")]
    Clone(String),
    #[error("branch push failed: {0}")]
    PushBranches(String),
    #[error("tag push failed: {0}")]
    PushTags(String),
}

#[derive(Clone, Copy)]
pub struct TransferRequest<'a> {
    pub source_url: &'a str,
    pub source_token: &'a str,
    pub target_url: &'a str,
    pub target_token: &'a str,
    pub work_dir: &'a Path,
    pub force_push: bool,
}

/// Inserts `x-access-token:<token>@` right after the scheme separator.
pub fn authenticated_url(url: &str, token: &str) -> Result<String, TransferError> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(TransferError::InvalidUrl(sanitize(url)));
    };
    Ok(format!("{scheme}://x-access-token:{token}@{rest}"))
}

/// Clones the source as a mirror into `work_dir`, then pushes branches and
/// tags to the target. Tags are only attempted once branches went through;
/// a tag failure leaves the pushed branches in place.
pub async fn transfer(
    transport: &dyn MirrorTransport,
    request: TransferRequest<'_>,
) -> Result<(), TransferError> {
    let source = authenticated_url(request.source_url, request.source_token)?;
    let repo_dir = mirror_dir(request.work_dir);

    info!(source = %request.source_url, "cloning source mirror");
    transport
        .mirror_clone(&source, &repo_dir)
        .await
        .map_err(|err| TransferError::Clone(sanitize_error(&err)))?;

    let target = authenticated_url(request.target_url, request.target_token)?;
    info!(
        target = %request.target_url,
        force = request.force_push,
        "pushing branches"
    );
    transport
        .push_refspec(&repo_dir, &target, BRANCH_REFSPEC, request.force_push)
        .await
        .map_err(|err| TransferError::PushBranches(sanitize_error(&err)))?;

    info!(target = %request.target_url, force = request.force_push, "pushing tags");
    transport
        .push_refspec(&repo_dir, &target, TAG_REFSPEC, request.force_push)
        .await
        .map_err(|err| TransferError::PushTags(sanitize_error(&err)))?;
    Ok(())
}

/// Runs the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: OsString,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, action: &str, args: Vec<OsString>) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(action, "spawning git");
        let output = cmd
            .output()
            .await
            .with_context(|| format!("spawn git {action}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("git {action} exited with {}: {}", output.status, stderr.trim());
        }
        Ok(())
    }
}

impl MirrorTransport for GitCli {
    fn mirror_clone<'a>(&'a self, url: &'a str, dest: &'a Path) -> TransportFuture<'a> {
        Box::pin(async move {
            let args = vec![
                OsString::from("clone"),
                OsString::from("--mirror"),
                OsString::from(url),
                dest.as_os_str().to_owned(),
            ];
            self.run("clone --mirror", args).await
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
            let mut args = vec![
                OsString::from("-C"),
                repo_dir.as_os_str().to_owned(),
                OsString::from("push"),
            ];
            if force {
                args.push(OsString::from("--force"));
            }
            args.push(OsString::from(url));
            args.push(OsString::from(refspec));
            self.run("push", args).await
        })
    }
}

/// Path of the bare mirror inside a scratch directory.
pub fn mirror_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(MIRROR_DIR_NAME)
}

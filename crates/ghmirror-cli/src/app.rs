use crate::actions::ActionsEnv;
use crate::config::{Cli, RunConfig};
use crate::logging;
use crate::summary::print_summary;
use anyhow::Context;
use clap::Parser;
use ghmirror_core::mirror_transfer::GitCli;
use ghmirror_core::redact::sanitize_error;
use ghmirror_core::repo_list::load_repo_list;
use ghmirror_core::sync_engine::{HostBinding, SyncEngine};
use ghmirror_core::sync_engine_types::{RunSummary, SyncProgress};
use ghmirror_providers::GitHubHost;
use std::process::ExitCode;
use tracing::{error, info, warn};

const EXIT_SUCCESS: u8 = 0;
const EXIT_REPO_FAILURES: u8 = 1;
const EXIT_FATAL: u8 = 2;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let actions = ActionsEnv::from_lookup(env_lookup);
    if let Err(err) = logging::init(actions.enabled) {
        eprintln!("error: {err:#}");
        return ExitCode::from(EXIT_FATAL);
    }

    let result = execute(&cli, &actions).await;
    match &result {
        Ok(summary) if !summary.is_success() => {
            error!(failed = summary.failed, "some repositories failed to mirror");
        }
        Ok(_) => {}
        Err(err) => {
            let message = sanitize_error(err);
            error!(error = %message, "mirror run aborted");
            eprintln!("error: {message}");
        }
    }
    ExitCode::from(exit_status(&result))
}

fn exit_status(result: &anyhow::Result<RunSummary>) -> u8 {
    match result {
        Ok(summary) if summary.is_success() => EXIT_SUCCESS,
        Ok(_) => EXIT_REPO_FAILURES,
        Err(_) => EXIT_FATAL,
    }
}

async fn execute(cli: &Cli, actions: &ActionsEnv) -> anyhow::Result<RunSummary> {
    let config = RunConfig::resolve(cli, env_lookup)?;
    actions.mask(&[config.source.token.as_str(), config.target.token.as_str()]);
    info!(
        source = %config.source.api_url,
        target = %config.target.api_url,
        overwrite_visibility = config.settings.overwrite_visibility,
        force_push = config.settings.force_push,
        "resolved configuration"
    );

    let specs = load_repo_list(&config.repo_list_path)?;
    info!(
        path = %config.repo_list_path.display(),
        repos = specs.len(),
        "loaded repository list"
    );

    let source_api = GitHubHost::new(&config.source).context("source API client")?;
    let target_api = GitHubHost::new(&config.target).context("target API client")?;
    let git = GitCli::default();
    let mut engine = SyncEngine::new(
        HostBinding {
            api: &source_api,
            config: &config.source,
        },
        HostBinding {
            api: &target_api,
            config: &config.target,
        },
        &git,
        config.settings,
    );
    if let Some(temp) = &actions.runner_temp {
        engine = engine.with_scratch_root(temp.clone());
    }

    let progress = |event: SyncProgress<'_>| match event {
        SyncProgress::Starting { index, total, spec } => {
            actions.group(&format!(
                "[{}/{}] {} -> {}",
                index + 1,
                total,
                spec.source,
                spec.target
            ));
        }
        SyncProgress::Finished { .. } => actions.end_group(),
    };
    let summary = engine.run(&specs, Some(&progress)).await;

    print_summary(&summary);
    if let Err(err) = actions.publish(&summary) {
        warn!(error = %format!("{err:#}"), "failed to publish workflow summary");
    }
    Ok(summary)
}

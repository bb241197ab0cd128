use clap::Parser;
use ghmirror_core::model::{HostConfig, SyncSettings};
use std::path::PathBuf;

const DEFAULT_REPO_LIST: &str = "repos.yml";
const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Parser, Debug, Default)]
#[command(
    name = "ghmirror",
    author,
    version,
    about = "Mirror a list of GitHub repositories from one host to another"
)]
pub struct Cli {
    #[arg(long, env = "REPO_LIST_FILE", help = "YAML file listing the repositories to mirror")]
    pub repo_list_file: Option<String>,
    #[arg(long, env = "SOURCE_API_URL", help = "REST API base URL of the source host")]
    pub source_api_url: Option<String>,
    #[arg(long, env = "TARGET_API_URL", help = "REST API base URL of the target host")]
    pub target_api_url: Option<String>,
    #[arg(long, env = "SOURCE_TOKEN", hide_env_values = true)]
    pub source_token: Option<String>,
    #[arg(long, env = "TARGET_TOKEN", hide_env_values = true)]
    pub target_token: Option<String>,
    #[arg(
        long,
        env = "OVERWRITE_VISIBILITY",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Change the visibility of existing target repositories"
    )]
    pub overwrite_visibility: Option<String>,
    #[arg(
        long,
        env = "FORCE_PUSH",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Force-push branches and tags to the target"
    )]
    pub force_push: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required input `{0}`")]
    MissingToken(&'static str),
    #[error("invalid boolean for `{name}`: {value:?}")]
    InvalidBool { name: &'static str, value: String },
}

/// Settings for one run, fixed at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub repo_list_path: PathBuf,
    pub source: HostConfig,
    pub target: HostConfig,
    pub settings: SyncSettings,
}

impl RunConfig {
    /// Layers runner inputs from `lookup` over the parsed command line.
    pub fn resolve(
        cli: &Cli,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let value = |name: &str, flag: Option<&String>| layered(&lookup, name, flag);

        let repo_list = value("repo-list-file", cli.repo_list_file.as_ref())
            .unwrap_or_else(|| DEFAULT_REPO_LIST.to_string());
        let source_api = value("source-api-url", cli.source_api_url.as_ref())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let target_api = value("target-api-url", cli.target_api_url.as_ref())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let source_token = value("source-token", cli.source_token.as_ref())
            .ok_or(ConfigError::MissingToken("source-token"))?;
        let target_token = value("target-token", cli.target_token.as_ref())
            .ok_or(ConfigError::MissingToken("target-token"))?;
        let overwrite_visibility = flag_value(
            "overwrite-visibility",
            value("overwrite-visibility", cli.overwrite_visibility.as_ref()),
        )?;
        let force_push = flag_value("force-push", value("force-push", cli.force_push.as_ref()))?;

        Ok(Self {
            repo_list_path: PathBuf::from(repo_list),
            source: HostConfig::new(&source_api, source_token),
            target: HostConfig::new(&target_api, target_token),
            settings: SyncSettings {
                overwrite_visibility,
                force_push,
            },
        })
    }
}

/// Runner input (`INPUT_REPO-LIST-FILE`), then the input-style variable
/// (`INPUT_REPO_LIST_FILE`), then whatever clap resolved from the flag or
/// plain variable. Blank values are skipped.
fn layered(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    flag: Option<&String>,
) -> Option<String> {
    let upper = name.to_ascii_uppercase();
    let runner_input = lookup(&format!("INPUT_{upper}"));
    let input_style = lookup(&format!("INPUT_{}", upper.replace('-', "_")));
    [runner_input, input_style, flag.cloned()]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

fn flag_value(name: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(false),
        Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidBool { name, value }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

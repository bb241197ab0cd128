//! GitHub REST implementation of [`ghmirror_core::host::RepoHost`].

pub mod github;
mod github_models;
mod http;

pub use github::GitHubHost;

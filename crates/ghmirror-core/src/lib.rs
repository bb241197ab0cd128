pub mod actions_permission;
pub mod archive_state;
pub mod host;
pub mod instance_url;
pub mod mirror_transfer;
pub mod model;
pub mod reconcile;
pub mod redact;
pub mod repo_list;
pub mod sync_engine;
pub mod sync_engine_types;

#[cfg(test)]
mod test_support;

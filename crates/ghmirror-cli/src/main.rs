use std::process::ExitCode;

mod actions;
mod app;
mod config;
mod logging;
mod summary;

#[tokio::main]
async fn main() -> ExitCode {
    app::run().await
}

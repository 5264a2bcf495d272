use thiserror::Error;

use crate::api::server::RouteError;
use crate::util::telemetry;

mod api;
mod db;
mod leaderboard;
mod scoring;
mod util;

#[derive(Debug, Error)]
enum RunnerErr {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error(transparent)]
    Std(#[from] Box<dyn std::error::Error>),
}

type Result<T> = core::result::Result<T, RunnerErr>;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry_registry = telemetry::Telemetry::new().await?.register();

    tracing::info!("starting main application");
    let outcome = api::server::serve().await;

    telemetry_registry.shutdown();
    outcome?;

    Ok(())
}

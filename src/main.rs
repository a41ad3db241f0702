use anyhow::Context;
use fitness_services::{start, ServiceProfile};

/// Runs whichever service `SERVICE_NAME` names, so one image can back all five.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // SERVICE_NAME may come from .env, so load it before `start` does.
    dotenvy::dotenv().ok();

    let profile: ServiceProfile = std::env::var("SERVICE_NAME")
        .context("SERVICE_NAME environment variable is required")?
        .parse()?;

    start(profile).await
}

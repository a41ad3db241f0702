use fitness_services::{start, ServiceProfile};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    start(ServiceProfile::Progress).await
}

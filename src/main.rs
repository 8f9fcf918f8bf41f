use anyhow::Result;
use iiko_relay::config::Settings;
use iiko_relay::infrastructure::telemetry;
use iiko_relay::Application;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::new()?;
    telemetry::init(&settings.logging)?;

    info!("Starting iiko relay");

    let app = Application::build(settings).await?;
    app.run().await?;

    Ok(())
}

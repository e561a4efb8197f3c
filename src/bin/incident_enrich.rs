//! Incident enrichment service binary.
//!
//! Loads configuration from the environment (with `.env` support for local
//! runs) and serves the webhook intake until SIGTERM/Ctrl+C.

use incident_enrich::server::IntakeConfig;
use incident_enrich::{EnrichConfig, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local-dev convenience; deployed environments set real variables.
    dotenvy::dotenv().ok();

    let intake = IntakeConfig::load()?;
    let enrich = EnrichConfig::load()?;

    server::start_server(intake, enrich).await?;

    Ok(())
}

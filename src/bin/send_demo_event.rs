//! Manual test driver for the webhook intake.
//!
//! Sends one `incident.triggered` event and one unrelated event at a
//! locally running server and prints the acknowledgments. Handy for
//! checking the full loop against real collaborators without waiting for a
//! live alert.

use reqwest::Client;
use serde_json::json;

const SERVER_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/api/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("2. Triggered Incident:");
    let resp = client
        .post(format!("{SERVER_URL}/api/webhook"))
        .json(&json!({
            "event": {
                "id": "evt-demo-001",
                "event_type": "incident.triggered",
                "resource_type": "incident",
                "occurred_at": "2025-06-01T12:00:00Z",
                "data": {
                    "id": "PDEMO01",
                    "type": "incident",
                    "title": "High CPU usage on payment-service",
                    "description": "CPU utilization exceeded 90% threshold for 5 minutes.",
                    "service": { "summary": "payment-service" },
                    "urgency": "high",
                    "status": "triggered"
                }
            }
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("3. Non-Trigger Event (should be ignored):");
    let resp = client
        .post(format!("{SERVER_URL}/api/webhook"))
        .json(&json!({
            "event": {
                "id": "evt-demo-002",
                "event_type": "incident.acknowledged",
                "resource_type": "incident",
                "data": { "id": "PDEMO01" }
            }
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("Done. Watch the server logs for the enrichment run.");
    Ok(())
}

//! Calls a running CLIR server.
//!
//! ```text
//! cargo run -p clir-server --example search_client -- "query translation"
//! ```

use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cross-language retrieval".to_string());
    let client = Client::new();

    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("2. Search for {query:?}:");
    let resp = client
        .post(format!("{SERVER_URL}/api/search"))
        .json(&json!({ "query": query, "top_k": 3 }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let warnings = resp
        .headers()
        .get("x-clir-warnings")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("0")
        .to_string();
    let results: Value = resp.json().await?;
    for r in results.as_array().into_iter().flatten() {
        println!(
            "  {:>6.3}  {}  {}",
            r["relevance_score"].as_f64().unwrap_or_default(),
            r["title"].as_str().unwrap_or_default(),
            r["translated_title"].as_str().unwrap_or("-"),
        );
    }
    println!("Warnings: {warnings}");
    println!();

    println!("3. Empty query (expect 400):");
    let resp = client
        .post(format!("{SERVER_URL}/api/search"))
        .json(&json!({ "query": "   " }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}

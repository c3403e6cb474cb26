//! httpbin demo
//!
//! Drives cora against <https://httpbin.org>, or any server given as the
//! first argument.

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]
#![allow(dead_code)]

use cora::prelude::*;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Data Types
// ============================================================================

/// What httpbin echoes back for `/anything`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Echo {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: std::collections::BTreeMap<String, String>,
    #[serde(default)]
    pub json: Option<serde::de::IgnoredAny>,
}

/// A payload to post.
#[derive(Debug, Clone, Serialize)]
pub struct Greeting {
    pub from: String,
    pub text: String,
}

// ============================================================================
// Calls
// ============================================================================

async fn echo_get(client: &Cora, base: &str) -> Response {
    let mut echo = Echo::default();
    let response = client
        .get(&format!("{base}/anything"), &[])
        .await
        .decode_json(&mut echo);

    if response.error().is_none() {
        println!("GET echoed {} {}", echo.method, echo.url);
    }
    response
}

async fn echo_post(client: &Cora, base: &str) -> Response {
    let greeting = Greeting {
        from: "cora".to_string(),
        text: "hello".to_string(),
    };
    let mut echo = Echo::default();
    let response = client
        .post(
            &format!("{base}/anything"),
            Payload::value(&greeting),
            &[],
        )
        .await
        .decode_json(&mut echo);

    if response.error().is_none() {
        println!(
            "POST sent as {:?}",
            echo.headers.get("Content-Type").map(String::as_str)
        );
    }
    response
}

async fn missing(client: &Cora, base: &str) -> Response {
    client.get(&format!("{base}/status/404"), &[]).await
}

fn report(label: &str, response: &Response) {
    match response.error() {
        Some(err) => println!("{label}: status {} failed: {err}", response.status()),
        None => println!("{label}: status {}", response.status()),
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org".to_string());

    let client = Cora::new().set_headers([Header::single("User-Agent", "cora-httpbin-demo/0.1.0")]);

    report("get", &echo_get(&client, &base).await);
    report("post", &echo_post(&client, &base).await);
    report("missing", &missing(&client, &base).await);
}

// ============================================================================
// Tests using wiremock
// ============================================================================

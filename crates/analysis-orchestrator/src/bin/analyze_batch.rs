use std::io::Read;

use analysis_orchestrator::{load_config, AnalysisOrchestrator, AssetInputs, BatchRequest};
use anyhow::{Context, Result};
use serde_json::Value;

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // logs go to stderr so stdout stays a clean JSON report
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn read_input(path: Option<String>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read batch file {}", path)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read batch from stdin")?;
            Ok(buf)
        }
    }
}

/// Accepts either a full batch request or a bare list of assets.
fn parse_request(raw: &str) -> Result<BatchRequest> {
    let doc: Value = serde_json::from_str(raw).context("Batch input is not valid JSON")?;
    if doc.is_array() {
        let assets: Vec<AssetInputs> =
            serde_json::from_value(doc).context("Invalid asset list")?;
        return Ok(BatchRequest {
            assets,
            secondary_count: 3,
            ..Default::default()
        });
    }
    serde_json::from_value(doc).context("Invalid batch request")
}

fn main() -> Result<()> {
    init_tracing();

    let config = load_config()?;
    let orchestrator = AnalysisOrchestrator::new(config)?;

    let raw = read_input(std::env::args().nth(1))?;
    let request = parse_request(&raw)?;
    tracing::info!("Loaded batch with {} assets", request.assets.len());

    let report = orchestrator.run(&request);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

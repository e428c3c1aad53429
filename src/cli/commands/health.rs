use std::time::Duration;

use clap::Args;
use serde_json::{json, Value};

use crate::cli::{utils, OutputFormat};

#[derive(Args)]
pub struct HealthArgs {
    #[arg(default_value = "http://localhost:3000", help = "Server base URL")]
    pub url: String,

    #[arg(long, default_value_t = 5, help = "Timeout in seconds")]
    pub timeout: u64,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/health", args.url.trim_end_matches('/'));

    match client.get(&url).timeout(Duration::from_secs(args.timeout)).send().await {
        Ok(response) => {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            if status.is_success() {
                utils::output_success(output_format, &format!("{} is up", args.url), json!({ "health": body }), None)
            } else {
                utils::output_error(output_format, &format!("{} is degraded ({})", args.url, status), Some("DEGRADED"))?;
                anyhow::bail!("server reported {}", status)
            }
        }
        Err(e) => {
            utils::output_error(output_format, &format!("{} is unreachable: {}", args.url, e), Some("UNREACHABLE"))?;
            anyhow::bail!("health check failed")
        }
    }
}

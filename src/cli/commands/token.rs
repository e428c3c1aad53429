use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, help = "User id (random when omitted)")]
    pub user: Option<Uuid>,

    #[arg(long, default_value = "dev@example.com", help = "Email claim")]
    pub email: String,

    #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    let user = args.user.unwrap_or_else(Uuid::new_v4);
    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);

    let claims = Claims::new(user, &args.email, &config.security.jwt_audience, hours)?;
    let token = generate_jwt(&claims, &config.security.jwt_secret).context("JWT_SECRET must be set")?;

    utils::output_success(
        output_format,
        &format!("Token for {} ({}) valid {}h", args.email, user, hours),
        json!({ "token": token, "user_id": user, "expires_at": claims.exp }),
        Some(&token),
    )
}

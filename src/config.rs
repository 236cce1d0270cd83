// src/config.rs

use dotenvy::dotenv;
use std::env;

/// Number of historical questions drawn into each quiz paper.
pub const HISTORICAL_QUOTA: i64 = 30;
/// Number of math questions drawn into each quiz paper.
pub const MATH_QUOTA: i64 = 30;
/// Number of logical questions drawn into each quiz paper.
pub const LOGICAL_QUOTA: i64 = 40;

/// Minimum percentage required to pass a quiz.
pub const PASS_THRESHOLD: i32 = 70;

/// Sentinel value a taker submits for a question left blank.
pub const UNANSWERED: i32 = -1;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            admin_name: env::var("ADMIN_NAME").ok(),
        }
    }
}

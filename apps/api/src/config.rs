use anyhow::{Context, Result};

use crate::layout::PaperSize;

/// Application configuration loaded from environment variables.
/// Every key is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub paper_size: PaperSize,
    /// Currency code printed in the line-item table captions.
    pub currency: String,
    /// Reject tank options that have no name.
    pub require_tank_names: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            paper_size: PaperSize::A4,
            currency: "AED".to_string(),
            require_tank_names: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let paper = env_or("PAPER_SIZE", "A4");
        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            paper_size: PaperSize::parse(&paper)
                .with_context(|| format!("PAPER_SIZE must be A4 or LETTER, got '{paper}'"))?,
            currency: env_or("QUOTE_CURRENCY", "AED").trim().to_uppercase(),
            require_tank_names: parse_flag(&env_or("REQUIRE_TANK_NAMES", "false"))
                .context("REQUIRE_TANK_NAMES must be true or false")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}

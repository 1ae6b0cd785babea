use std::env;

use anyhow::{Context, Result};

use crate::db::DEFAULT_MAX_POOL_SIZE;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub openai_api_key: String,
    pub openai_model: String,
    pub extract_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub fetch_max_redirects: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let openai_api_key = env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let extract_timeout_secs = env::var("EXTRACT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("EXTRACT_TIMEOUT_SECS must be an integer")?;
        let fetch_timeout_secs = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("FETCH_TIMEOUT_SECS must be an integer")?;
        let fetch_max_redirects = env::var("FETCH_MAX_REDIRECTS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("FETCH_MAX_REDIRECTS must be an integer")?;

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            cors_allowed_origin,
            openai_api_key,
            openai_model,
            extract_timeout_secs,
            fetch_timeout_secs,
            fetch_max_redirects,
        })
    }

    pub fn redacted_api_key(&self) -> String {
        redact_secret(&self.openai_api_key)
    }
}

fn redact_secret(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::redact_secret;

    #[test]
    fn keeps_only_edges_of_long_secrets() {
        let redacted = redact_secret("sk-abcdefghijklmnop");
        assert_eq!(redacted, "sk-a...mnop");
        assert!(!redacted.contains("bcdefghijkl"));
    }

    #[test]
    fn hides_short_secrets_entirely() {
        assert_eq!(redact_secret("short"), "***");
        assert_eq!(redact_secret(""), "***");
    }
}

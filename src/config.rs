//! Relay configuration, read from the environment (`.env` honoured via dotenvy).

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use url::Url;

use crate::mcp::ClientInfo;

pub const DEFAULT_MCP_SERVER_URL: &str = "https://portal-poker.azurewebsites.net/mcp";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Remote MCP poker endpoint.
    pub mcp_url: Url,
    pub port: u16,
    /// Deadline for every outbound MCP request.
    pub mcp_timeout: Duration,
    pub client: ClientInfo,
    /// Pause between consecutive `trigger_ai` calls.
    pub ai_step_delay: Duration,
    /// `trigger_ai` calls allowed before a hand is declared stalled.
    pub ai_max_steps: usize,
    pub cors_origins: Vec<String>,
    /// Client sessions kept before the least recently used one is dropped.
    pub max_sessions: usize,
    /// Table views kept before the least recently used one is dropped.
    pub max_tables: usize,
    /// Sessions and table views unused for this long are forgotten.
    pub idle_ttl: Duration,
}

impl RelayConfig {
    /// Defaults for everything except the endpoint.
    pub fn for_endpoint(mcp_url: Url) -> Self {
        Self {
            mcp_url,
            port: 8080,
            mcp_timeout: Duration::from_secs(20),
            client: ClientInfo {
                name: "mellipoker-ai".to_string(),
                version: "1.0.0".to_string(),
            },
            ai_step_delay: Duration::from_millis(300),
            ai_max_steps: 64,
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:5000".to_string(),
            ],
            max_sessions: 256,
            max_tables: 256,
            idle_ttl: Duration::from_secs(30 * 60),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let raw_url = std::env::var("MCP_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_MCP_SERVER_URL.to_string());
        let mcp_url = Url::parse(&raw_url)
            .with_context(|| format!("MCP_SERVER_URL is not a valid URL: {raw_url}"))?;

        let mut cfg = Self::for_endpoint(mcp_url);
        cfg.port = env_or("PORT", cfg.port)?;
        cfg.mcp_timeout = Duration::from_secs(env_or("MCP_TIMEOUT_SECS", 20u64)?.max(1));
        cfg.ai_step_delay = Duration::from_millis(env_or("AI_STEP_DELAY_MS", 300u64)?);
        cfg.ai_max_steps = env_or("AI_MAX_STEPS", cfg.ai_max_steps)?;
        cfg.max_sessions = env_or("MAX_CLIENT_SESSIONS", cfg.max_sessions)?.max(1);
        cfg.max_tables = env_or("MAX_TABLES", cfg.max_tables)?.max(1);
        cfg.idle_ttl = Duration::from_secs(env_or("IDLE_TTL_SECS", cfg.idle_ttl.as_secs())?);

        if let Ok(name) = std::env::var("MCP_CLIENT_NAME") {
            cfg.client.name = name;
        }
        if let Ok(version) = std::env::var("MCP_CLIENT_VERSION") {
            cfg.client.version = version;
        }
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            cfg.cors_origins = parse_list(&origins);
        }

        Ok(cfg)
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_for_endpoint() {
        let cfg = RelayConfig::for_endpoint(Url::parse("http://127.0.0.1:9/mcp").unwrap());
        assert_eq!(cfg.mcp_timeout, Duration::from_secs(20));
        assert_eq!(cfg.ai_step_delay, Duration::from_millis(300));
        assert_eq!(cfg.ai_max_steps, 64);
        assert_eq!(cfg.client.name, "mellipoker-ai");
        assert_eq!((cfg.max_sessions, cfg.max_tables), (256, 256));
        assert_eq!(cfg.idle_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn origin_list_is_trimmed() {
        assert_eq!(
            parse_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}

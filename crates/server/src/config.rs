//! Server configuration

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Configuration problems that stop the process from starting
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Graph database connection settings
#[derive(Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: String,
    pub query_timeout: Duration,
}

/// Completion endpoint settings
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub timeout: Duration,
}

/// Server configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub graph: GraphConfig,
    pub completion: CompletionConfig,
    pub bind_address: String,
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
}

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

impl Config {
    /// Load configuration from the process environment (and `.env`, if present)
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut required = |name: &'static str| {
            get(name).unwrap_or_else(|| {
                missing.push(name);
                String::new()
            })
        };
        let uri = required("NEO4J_URI");
        let username = required("NEO4J_USERNAME");
        let password = required("NEO4J_PASSWORD");
        let completion_key = required("ANTHROPIC_API_KEY");
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        Ok(Self {
            graph: GraphConfig {
                uri,
                username,
                password,
                database: get("NEO4J_DATABASE").unwrap_or_else(|| "neo4j".into()),
                query_timeout: secs(&get, "GRAPH_QUERY_TIMEOUT_SECS", 10)?,
            },
            completion: CompletionConfig {
                api_key: completion_key,
                model: get("ANTHROPIC_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into()),
                api_url: get("ANTHROPIC_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into()),
                timeout: secs(&get, "COMPLETION_TIMEOUT_SECS", 30)?,
            },
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8000".into()),
            api_key: get("API_KEY"),
            cors_origins: get("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["*".to_string()]),
            rate_limit_rps: number(&get, "RATE_LIMIT_RPS", 100)?,
        })
    }
}

fn number<F>(get: &F, name: &'static str, default: u64) -> Result<u32, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match get(name) {
        None => default,
        Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })?,
    };
    if value == 0 || value > u32::MAX as u64 {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("must be between 1 and {}", u32::MAX),
        });
    }
    Ok(value as u32)
}

fn secs<F>(get: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    number(get, name, default).map(|s| Duration::from_secs(s as u64))
}

/// Strip credentials from a connection URI for logging
pub fn redact_uri(uri: &str) -> String {
    match (uri.find("://"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***@{}", &uri[..scheme_end], &uri[at + 1..])
        }
        _ => uri.to_string(),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("neo4j_uri", &redact_uri(&self.graph.uri))
            .field("neo4j_username", &self.graph.username)
            .field("neo4j_password", &"***")
            .field("neo4j_database", &self.graph.database)
            .field("completion_api_key", &"***")
            .field("completion_model", &self.completion.model)
            .field("bind_address", &self.bind_address)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("cors_origins", &self.cors_origins)
            .field("rate_limit_rps", &self.rate_limit_rps)
            .finish()
    }
}

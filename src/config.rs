use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Connection settings for the remote warehouse.
#[derive(Debug, Clone, Deserialize)]
pub struct WarehouseConfig {
    pub user: String,
    pub password: String,
    /// `host` or `host:port`
    pub account: String,
    pub database: String,
    pub schema: String,
    /// Compute warehouse label, sent as the connection's application name.
    pub warehouse: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub warehouse: WarehouseConfig,
    pub completion: CompletionConfig,
    pub jwt: JwtConfig,
    pub cors_origin: String,
}

fn required(name: &str) -> anyhow::Result<String> {
    std::env::var(name).with_context(|| format!("missing env var {name}"))
}

fn optional(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let warehouse = WarehouseConfig {
            user: required("WAREHOUSE_USER")?,
            password: required("WAREHOUSE_PASSWORD")?,
            account: required("WAREHOUSE_ACCOUNT")?,
            database: required("WAREHOUSE_DATABASE")?,
            schema: optional("WAREHOUSE_SCHEMA", "public"),
            warehouse: optional("WAREHOUSE_NAME", "moodmind"),
        };
        let completion = CompletionConfig {
            api_key: required("OPENAI_API_KEY")?,
            base_url: optional("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: optional("OPENAI_MODEL", "gpt-3.5-turbo"),
        };
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: optional("JWT_ISSUER", "moodmind"),
            audience: optional("JWT_AUDIENCE", "moodmind-users"),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        Ok(Self {
            warehouse,
            completion,
            jwt,
            cors_origin: optional("CORS_ORIGIN", "http://localhost:3000"),
        })
    }
}

impl WarehouseConfig {
    /// Splits `account` into host and optional port.
    pub fn host_port(&self) -> (&str, Option<u16>) {
        match self.account.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(p) => (host, Some(p)),
                Err(_) => (self.account.as_str(), None),
            },
            None => (self.account.as_str(), None),
        }
    }
}

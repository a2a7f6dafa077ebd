use atelier_core::domains::InternalDomains;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// The studio's own email domains, parsed from comma-separated
    /// `INTERNAL_DOMAINS`. Sender/domain patterns are never learned from
    /// these, and auto-apply never fires for them.
    pub internal_domains: InternalDomains,
    /// Global switch for pattern auto-apply during detector ingestion
    /// (`AUTO_APPLY_PATTERNS`, default: off). Individual patterns carry
    /// their own `auto_apply` flag as well; both must be on.
    pub auto_apply_enabled: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `INTERNAL_DOMAINS`     | `bensley.com`              |
    /// | `AUTO_APPLY_PATTERNS`  | `false`                    |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let internal_domains = InternalDomains::from_csv(
            &std::env::var("INTERNAL_DOMAINS").unwrap_or_else(|_| "bensley.com".into()),
        );

        let auto_apply_enabled = std::env::var("AUTO_APPLY_PATTERNS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            internal_domains,
            auto_apply_enabled,
        }
    }
}

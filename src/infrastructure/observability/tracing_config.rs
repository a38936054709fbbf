pub const DEFAULT_FILTER: &str = "info,doc2text=debug,tower_http=debug";

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
    /// Filter directives used when `RUST_LOG` is unset.
    pub filter: String,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, json_format: bool, level: &str) -> Self {
        let level = level.trim();
        let filter = if level.is_empty() {
            DEFAULT_FILTER.to_string()
        } else if level.contains('=') || level.contains(',') {
            level.to_string()
        } else {
            format!("{level},doc2text=debug,tower_http=debug")
        };

        Self {
            environment: environment.into(),
            json_format,
            filter,
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            environment: std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "local".to_string()),
            json_format: std::env::var("LOG_FORMAT")
                .map(|v| v.to_lowercase() == "json")
                .unwrap_or(false),
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

use std::time::Duration;

use config::{Config, ConfigError, File, Map};
use serde::Deserialize;

use super::environment::Environment;
use crate::presentation::router::DEFAULT_HEALTH_PATH;

pub const ENV_PREFIX: &str = "DOC2TEXT";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub http: HttpSettings,
    pub ocr: OcrSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub oidc: OidcSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub addr: String,
    pub request_timeout_secs: Option<u64>,
}

impl ServerSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    pub addr: String,
    pub health_check_path: String,
}

#[derive(Clone, Deserialize)]
pub struct OcrSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub iam_token: Option<String>,
    pub folder_id: Option<String>,
    pub model: Option<String>,
    pub languages: Vec<String>,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OcrSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("iam_token", &self.iam_token.as_ref().map(|_| "[REDACTED]"))
            .field("folder_id", &self.folder_id)
            .field("model", &self.model)
            .field("languages", &self.languages)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    S3,
    Local,
}

#[derive(Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub endpoint: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: Option<String>,
    pub region: String,
    pub use_ssl: bool,
    pub local_path: String,
}

impl std::fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSettings")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("use_ssl", &self.use_ssl)
            .field("local_path", &self.local_path)
            .finish()
    }
}

/// Identity-provider settings. Leaving all of them unset disables the auth
/// gate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OidcSettings {
    pub issuer: Option<String>,
    pub jwks_url: Option<String>,
    pub audience: Option<String>,
    pub expected_azp: Option<String>,
    pub jwks_refresh_secs: Option<u64>,
}

impl OidcSettings {
    pub fn is_configured(&self) -> bool {
        present(&self.issuer) && present(&self.jwks_url) && present(&self.audience)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load settings: {0}")]
    Load(#[from] ConfigError),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

impl Settings {
    /// Defaults, then `appsettings.<environment>` if present, then
    /// `DOC2TEXT__SECTION__KEY` environment variables.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        Self::load_from(environment, None)
    }

    /// Like [`load`](Self::load) but reads variables from `vars` instead of
    /// the process environment.
    pub fn load_from(
        environment: Environment,
        vars: Option<Map<String, String>>,
    ) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .set_default("server.addr", "0.0.0.0:8080")?
            .set_default("http.addr", "0.0.0.0:8090")?
            .set_default("http.health_check_path", DEFAULT_HEALTH_PATH)?
            .set_default("ocr.endpoint", crate::infrastructure::ocr::DEFAULT_ENDPOINT)?
            .set_default("ocr.languages", vec!["ru", "en"])?
            .set_default("ocr.timeout_secs", 30)?
            .set_default("storage.provider", "s3")?
            .set_default("storage.region", "us-east-1")?
            .set_default("storage.use_ssl", false)?
            .set_default("storage.local_path", "./data")?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("ocr.languages")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.http.health_check_path.starts_with('/') {
            return Err(SettingsError::Invalid(
                "http.health_check_path must start with '/'".to_string(),
            ));
        }

        if !present(&self.ocr.folder_id) {
            return Err(SettingsError::Invalid("ocr.folder_id is required".to_string()));
        }
        if !present(&self.ocr.api_key) && !present(&self.ocr.iam_token) {
            return Err(SettingsError::Invalid(
                "ocr.api_key or ocr.iam_token is required".to_string(),
            ));
        }
        if self.ocr.timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "ocr.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if self.storage.provider == StorageProviderSetting::S3 {
            let missing: Vec<&str> = [
                ("storage.endpoint", &self.storage.endpoint),
                ("storage.access_key", &self.storage.access_key),
                ("storage.secret_key", &self.storage.secret_key),
                ("storage.bucket", &self.storage.bucket),
            ]
            .into_iter()
            .filter(|(_, value)| !present(value))
            .map(|(name, _)| name)
            .collect();
            if !missing.is_empty() {
                return Err(SettingsError::Invalid(format!(
                    "missing S3 settings: {}",
                    missing.join(", ")
                )));
            }
        }

        self.validate_oidc()
    }

    fn validate_oidc(&self) -> Result<(), SettingsError> {
        let oidc = &self.oidc;
        let core = [&oidc.issuer, &oidc.jwks_url, &oidc.audience];
        let set = core.iter().filter(|value| present(value)).count();

        if set != 0 && set != core.len() {
            return Err(SettingsError::Invalid(
                "oidc.issuer, oidc.jwks_url and oidc.audience must be set together".to_string(),
            ));
        }
        if set == 0 && present(&oidc.expected_azp) {
            return Err(SettingsError::Invalid(
                "oidc.expected_azp requires oidc.issuer, oidc.jwks_url and oidc.audience"
                    .to_string(),
            ));
        }
        if let Some(url) = oidc.jwks_url.as_deref().filter(|u| !u.trim().is_empty()) {
            reqwest::Url::parse(url)
                .map_err(|e| SettingsError::Invalid(format!("oidc.jwks_url: {e}")))?;
        }
        Ok(())
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

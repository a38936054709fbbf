mod environment;
mod settings;

pub use environment::{ENVIRONMENT_VAR, Environment};
pub use settings::{
    ENV_PREFIX, HttpSettings, LoggingSettings, OcrSettings, OidcSettings, ServerSettings, Settings,
    SettingsError, StorageProviderSetting, StorageSettings,
};

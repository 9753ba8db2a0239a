mod settings;

pub use settings::{
    ApiConfig, LogFormat, LoggingConfig, OnboardingConfig, ServerConfig, Settings, StorageConfig,
};

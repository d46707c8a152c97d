mod manager;

pub use manager::{
    API_KEY_ENV, DEFAULT_API_MODEL, DEFAULT_API_URL, DEFAULT_API_URL_PATH,
    DEFAULT_TARGET_LANGUAGE, OpenAiSettings, Settings, SettingsManager, Theme,
};

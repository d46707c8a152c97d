use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::fs::atomic_write;
use crate::llm::ChatConfig;
use crate::paths;

/// Environment variable that overrides the stored API key.
pub const API_KEY_ENV: &str = "OXYGEN_API_KEY";

pub const DEFAULT_API_URL: &str = "https://api.openai.com";
pub const DEFAULT_API_URL_PATH: &str = "/v1/chat/completions";
pub const DEFAULT_API_MODEL: &str = "gpt-4o";
pub const DEFAULT_TARGET_LANGUAGE: &str = "中文";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// The `openai` settings block.
///
/// Blank fields fall back to the built-in defaults when a [`ChatConfig`] is
/// derived. The API key has no default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub api_model: String,
    pub api_url: String,
    pub api_url_path: String,
    pub target_language: String,
}

impl OpenAiSettings {
    /// Gets the API key, preferring the environment variable over the settings file.
    pub fn get_api_key(&self) -> String {
        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.trim().is_empty()
        {
            return key;
        }
        self.api_key.clone()
    }

    pub fn target_language(&self) -> &str {
        or_default(&self.target_language, DEFAULT_TARGET_LANGUAGE)
    }

    /// Builds the endpoint configuration used by the chat clients.
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            api_key: self.get_api_key(),
            api_url: or_default(&self.api_url, DEFAULT_API_URL).to_string(),
            api_url_path: or_default(&self.api_url_path, DEFAULT_API_URL_PATH).to_string(),
            api_model: or_default(&self.api_model, DEFAULT_API_MODEL).to_string(),
        }
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value }
}

/// Application settings, persisted as a flat JSON object keyed by setting name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub theme: Theme,
    /// UI language code (e.g. `en`, `fr`).
    pub app_language: String,
    /// Operating system the settings were last loaded on.
    pub platform: String,
    pub dictionary: String,
    pub openai: OpenAiSettings,
    /// Settings this version does not know about; kept so they survive a save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            app_language: "en".to_string(),
            platform: std::env::consts::OS.to_string(),
            dictionary: String::new(),
            openai: OpenAiSettings {
                api_key: String::new(),
                api_model: DEFAULT_API_MODEL.to_string(),
                api_url: DEFAULT_API_URL.to_string(),
                api_url_path: DEFAULT_API_URL_PATH.to_string(),
                target_language: DEFAULT_TARGET_LANGUAGE.to_string(),
            },
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Looks up a setting by name; dotted names reach into nested blocks
    /// (`openai.apiModel`).
    pub fn get(&self, key: &str) -> Option<Value> {
        let root = serde_json::to_value(self).ok()?;
        key.split('.')
            .try_fold(&root, |value, part| value.get(part))
            .cloned()
    }

    /// Sets a setting by (possibly dotted) name.
    ///
    /// The change is rejected if the result no longer has the settings shape,
    /// e.g. a string where an object is expected.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if key.is_empty() || parts.iter().any(|part| part.is_empty()) {
            bail!("Invalid setting name: '{key}'");
        }

        let mut root = serde_json::to_value(&*self).context("Failed to serialize settings")?;
        let mut slot = &mut root;
        for part in &parts[..parts.len() - 1] {
            let object = slot
                .as_object_mut()
                .with_context(|| format!("Setting '{key}' is not inside an object"))?;
            slot = object
                .entry((*part).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }

        let last = parts[parts.len() - 1];
        slot.as_object_mut()
            .with_context(|| format!("Setting '{key}' is not inside an object"))?
            .insert(last.to_string(), value);

        *self = serde_json::from_value(root)
            .with_context(|| format!("Invalid value for setting '{key}'"))?;
        Ok(())
    }
}

/// Manages loading and saving the settings file.
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Creates a settings manager.
    ///
    /// Settings are stored at `$XDG_CONFIG_HOME/oxygen/settings.json`
    /// or `~/.config/oxygen/settings.json` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(paths::config_dir()?.join("settings.json")))
    }

    pub fn with_path(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn load(&self) -> Result<Settings> {
        let contents = fs::read_to_string(&self.settings_path).with_context(|| {
            format!(
                "Failed to read settings file: {}",
                self.settings_path.display()
            )
        })?;

        let mut settings: Settings =
            serde_json::from_str(&contents).context("Failed to parse settings file")?;
        settings.platform = std::env::consts::OS.to_string();

        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let contents =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;
        atomic_write(&self.settings_path, &contents)
    }

    /// Loads settings, never failing.
    ///
    /// A missing file is created with the defaults; an unreadable or invalid
    /// file is logged and the defaults are used without overwriting it.
    pub fn load_or_default(&self) -> Settings {
        if !self.settings_path.exists() {
            let settings = Settings::default();
            if let Err(e) = self.save(&settings) {
                tracing::warn!(error = %e, "failed to write default settings");
            }
            return settings;
        }

        self.load().unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.settings_path.display(),
                error = %format!("{e:#}"),
                "failed to load settings, using defaults"
            );
            Settings::default()
        })
    }

    /// Reads one setting.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.load_or_default().get(key)
    }

    /// Updates one setting and persists the whole file.
    pub fn set(&self, key: &str, value: Value) -> Result<Settings> {
        let mut settings = self.load_or_default();
        settings.set(key, value)?;
        self.save(&settings)?;
        Ok(settings)
    }
}

use emlsync::locale::Locale;
use emlsync::postmark::{DEFAULT_PAGE_SIZE, POSTMARK_API_URL, PostmarkConfig};
use emlsync::sync::AliasScheme;
use emlsync::translations::{ProjectId, TRANSLIZED_API_URL, TranslizedConfig};
use eyre::{Context, Result, bail, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the secrets settings file
pub const SETTINGS_ENV_VAR: &str = "MPLY_EML_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub locales: Vec<Locale>,
    pub paths: PathsConfig,
    pub postmark: PostmarkSection,
    pub translized: TranslizedSection,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub blueprints_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub translations_dir: PathBuf,
    pub pot_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            blueprints_dir: PathBuf::from("template_blueprints"),
            templates_dir: PathBuf::from("email_templates"),
            translations_dir: PathBuf::from("translations"),
            pot_file: PathBuf::from("translations/messages_eml.pot"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostmarkSection {
    pub base_url: String,
    pub page_size: u32,
    pub timeout_ms: u64,
}

impl Default for PostmarkSection {
    fn default() -> Self {
        Self {
            base_url: POSTMARK_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_ms: 30000,
        }
    }
}

impl PostmarkSection {
    pub fn client_config(&self) -> PostmarkConfig {
        PostmarkConfig {
            base_url: self.base_url.clone(),
            page_size: self.page_size,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslizedSection {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for TranslizedSection {
    fn default() -> Self {
        Self {
            base_url: TRANSLIZED_API_URL.to_string(),
            timeout_ms: 30000,
        }
    }
}

impl TranslizedSection {
    pub fn client_config(&self) -> TranslizedConfig {
        TranslizedConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub alias_scheme: AliasScheme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            locales: Locale::ALL.to_vec(),
            paths: PathsConfig::default(),
            postmark: PostmarkSection::default(),
            translized: TranslizedSection::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let project_name = env!("CARGO_PKG_NAME");
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let project_name = env!("CARGO_PKG_NAME");
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.locales.is_empty() {
            bail!("At least one locale must be configured");
        }
        for (i, locale) in self.locales.iter().enumerate() {
            if self.locales[..i].contains(locale) {
                bail!("Locale {} is listed twice", locale);
            }
        }
        if self.postmark.page_size == 0 {
            bail!("postmark.page_size must be positive");
        }
        Ok(())
    }
}

/// Secrets read from the TOML file named by `MPLY_EML_CONFIG`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(rename = "POSTMARK_SERVER_TOKEN")]
    pub postmark_server_token: Option<String>,

    #[serde(rename = "TRANSLIZED_API_KEY")]
    pub translized_api_key: Option<String>,

    #[serde(rename = "TRANSLIZED_PROJECT_ID")]
    pub translized_project_id: Option<ProjectId>,
}

impl Settings {
    /// Load settings from the path held in `MPLY_EML_CONFIG`
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(SETTINGS_ENV_VAR)
            .map_err(|_| eyre!("Environment variable {} is not set", SETTINGS_ENV_VAR))?;
        Self::load_from_file(&path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings {}", path.as_ref().display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings {}", path.as_ref().display()))?;
        Ok(settings)
    }

    pub fn postmark_server_token(&self) -> Result<&str> {
        required(self.postmark_server_token.as_deref(), "POSTMARK_SERVER_TOKEN")
    }

    pub fn translized_api_key(&self) -> Result<&str> {
        required(self.translized_api_key.as_deref(), "TRANSLIZED_API_KEY")
    }

    pub fn translized_project_id(&self) -> Result<&ProjectId> {
        self.translized_project_id
            .as_ref()
            .ok_or_else(|| emlsync::EmlError::MissingSetting("TRANSLIZED_PROJECT_ID".to_string()).into())
    }
}

fn required<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(emlsync::EmlError::MissingSetting(key.to_string()).into()),
    }
}

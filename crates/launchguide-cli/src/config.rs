//! Configuration file management for launchguide.
//!
//! Provides a TOML-based config file at `~/.config/launchguide/config.toml`
//! and a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use launchguide_core::aggregator::{Aggregator, AggregatorConfig};
use launchguide_core::catalog::SelectionPolicy;
use launchguide_core::plan::{ModelPlanGenerator, RetryPolicy};
use launchguide_core::provider::{
    ModelProvider, OfflineProvider, OpenAiCompatibleProvider, OpenAiSettings, ProviderRegistry,
};
use launchguide_core::store::FileStore;

pub const ENV_API_KEY: &str = "LAUNCHGUIDE_API_KEY";
pub const ENV_BASE_URL: &str = "LAUNCHGUIDE_BASE_URL";
pub const ENV_MODEL: &str = "LAUNCHGUIDE_MODEL";
pub const ENV_STORE_DIR: &str = "LAUNCHGUIDE_STORE_DIR";

pub const OPENAI_PROVIDER: &str = "openai";
pub const OFFLINE_PROVIDER: &str = "offline";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub provider: ProviderSection,
    pub generation: GenerationSection,
    pub storage: StorageSection,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    /// `openai` or `offline`.
    pub name: String,
    pub base_url: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            name: OPENAI_PROVIDER.to_string(),
            base_url: OpenAiSettings::DEFAULT_BASE_URL.to_string(),
            model: OpenAiSettings::DEFAULT_MODEL.to_string(),
            api_key: None,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSection {
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub channel_timeout_secs: u64,
    pub policy: SelectionPolicy,
}

impl Default for GenerationSection {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            max_retries: retry.max_retries,
            retry_backoff_ms: retry.backoff.as_millis() as u64,
            channel_timeout_secs: AggregatorConfig::default().channel_timeout.as_secs(),
            policy: SelectionPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the launchguide config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/launchguide` or
/// `~/.config/launchguide`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("launchguide");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("launchguide")
}

/// Return the path to the launchguide config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default directory for the stored plan.
pub fn default_store_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("launchguide")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix, since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct LaunchguideConfig {
    pub provider_name: String,
    pub openai: OpenAiSettings,
    pub retry: RetryPolicy,
    pub aggregator: AggregatorConfig,
    pub policy: SelectionPolicy,
    pub store_dir: PathBuf,
}

impl LaunchguideConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// A config file that exists but does not parse is an error; a missing
    /// one is not.
    pub fn resolve(cli_store_dir: Option<PathBuf>) -> Result<Self> {
        let file_config = if config_path().exists() {
            load_config()?
        } else {
            ConfigFile::default()
        };
        Self::from_file(file_config, cli_store_dir)
    }

    fn from_file(file: ConfigFile, cli_store_dir: Option<PathBuf>) -> Result<Self> {
        if file.provider.request_timeout_secs == 0 {
            anyhow::bail!("provider.request_timeout_secs must be greater than 0");
        }
        if file.generation.channel_timeout_secs == 0 {
            anyhow::bail!("generation.channel_timeout_secs must be greater than 0");
        }

        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let provider = file.provider;
        let openai = OpenAiSettings {
            base_url: env(ENV_BASE_URL).unwrap_or(provider.base_url),
            model: env(ENV_MODEL).unwrap_or(provider.model),
            api_key: env(ENV_API_KEY).or(provider.api_key),
            request_timeout: Duration::from_secs(provider.request_timeout_secs),
        };

        let store_dir = cli_store_dir
            .or_else(|| env(ENV_STORE_DIR).map(PathBuf::from))
            .or(file.storage.dir)
            .unwrap_or_else(default_store_dir);

        let generation = file.generation;
        Ok(Self {
            provider_name: provider.name,
            openai,
            retry: RetryPolicy {
                max_retries: generation.max_retries,
                backoff: Duration::from_millis(generation.retry_backoff_ms),
            },
            aggregator: AggregatorConfig {
                channel_timeout: Duration::from_secs(generation.channel_timeout_secs),
            },
            policy: generation.policy,
            store_dir,
        })
    }

    /// Every provider this configuration can build, keyed by name.
    pub fn build_registry(&self) -> Result<ProviderRegistry> {
        let mut registry = ProviderRegistry::new();
        registry.register(OfflineProvider::new());
        if self.openai.api_key.is_some() {
            let openai = OpenAiCompatibleProvider::new(self.openai.clone())
                .context("failed to build HTTP client for model provider")?;
            registry.register(openai);
        }
        Ok(registry)
    }

    /// The provider to generate with. Falls back to the offline provider
    /// when `openai` is configured without an API key.
    pub fn provider(&self, force_offline: bool) -> Result<Arc<dyn ModelProvider>> {
        let registry = self.build_registry()?;
        let wanted = if force_offline {
            OFFLINE_PROVIDER
        } else {
            self.provider_name.as_str()
        };

        if let Some(provider) = registry.get(wanted) {
            return Ok(provider);
        }
        if wanted == OPENAI_PROVIDER {
            tracing::warn!(
                "no API key configured (set {ENV_API_KEY} or run `launchguide init --api-key`); \
                 using the offline provider"
            );
            return registry
                .get(OFFLINE_PROVIDER)
                .context("offline provider is not registered");
        }
        anyhow::bail!(
            "unknown provider {wanted:?}; available: {}",
            registry.list().join(", ")
        )
    }

    pub fn build_aggregator(&self, force_offline: bool) -> Result<Aggregator> {
        let provider = self.provider(force_offline)?;
        tracing::debug!(provider = provider.name(), "plan generator ready");
        let generator = ModelPlanGenerator::new(provider, self.retry);
        Ok(Aggregator::new(Arc::new(generator), self.aggregator.clone()))
    }

    pub fn open_store(&self) -> Result<FileStore> {
        FileStore::open(&self.store_dir).with_context(|| {
            format!("failed to open plan store at {}", self.store_dir.display())
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

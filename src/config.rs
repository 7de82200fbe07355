use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub backend: BackendConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub content: ContentConfig,
  #[serde(default)]
  pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
  /// Base URL of the hosted data platform
  pub url: String,
}

/// Settings for the on-device cache store.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
  /// Set to false to run without the offline cache (every read hits the backend)
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Entries older than this are treated as gone
  #[serde(default = "default_expiry_days")]
  pub expiry_days: u32,
  /// Conservative on-device storage budget
  #[serde(default = "default_max_storage_mb")]
  pub max_storage_mb: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContentConfig {
  #[serde(default = "default_page_size")]
  pub articles_per_page: u32,
  #[serde(default = "default_page_size")]
  pub parts_per_page: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SearchConfig {
  /// Maximum results returned by a single search
  #[serde(default = "default_search_limit")]
  pub result_limit: usize,
}

fn default_true() -> bool {
  true
}

fn default_expiry_days() -> u32 {
  7
}

fn default_max_storage_mb() -> u32 {
  50
}

fn default_page_size() -> u32 {
  20
}

fn default_search_limit() -> usize {
  50
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      expiry_days: default_expiry_days(),
      max_storage_mb: default_max_storage_mb(),
    }
  }
}

impl Default for ContentConfig {
  fn default() -> Self {
    Self {
      articles_per_page: default_page_size(),
      parts_per_page: default_page_size(),
    }
  }
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      result_limit: default_search_limit(),
    }
  }
}

impl CacheConfig {
  /// Expiry window in milliseconds.
  pub fn expiry_ms(&self) -> i64 {
    i64::from(self.expiry_days) * 24 * 60 * 60 * 1000
  }

  /// Storage budget in bytes.
  pub fn max_storage_bytes(&self) -> u64 {
    u64::from(self.max_storage_mb) * 1024 * 1024
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./ictwiki.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/ictwiki/config.yaml
  /// 4. ~/.config/ictwiki/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/ictwiki/config.yaml"
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("ictwiki.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("ictwiki").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the backend anon key from environment variables.
  ///
  /// Checks ICTWIKI_ANON_KEY first, then SUPABASE_ANON_KEY as fallback.
  pub fn get_anon_key() -> Result<String> {
    std::env::var("ICTWIKI_ANON_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| {
        eyre!("Backend anon key not found. Set ICTWIKI_ANON_KEY or SUPABASE_ANON_KEY environment variable.")
      })
  }
}

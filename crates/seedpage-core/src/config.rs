//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` + `config.<env>.toml`
//! + `APP_*` env vars (nested keys separated by `__`, e.g. `APP_PAGING__MAX_SIZE`).
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub paging: PagingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// On-disk index location. Absent means an in-memory index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    pub writer_heap_bytes: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { dir: None, writer_heap_bytes: 50_000_000 }
    }
}

impl IndexSettings {
    pub fn resolved_dir(&self, base: &Path) -> Option<PathBuf> {
        self.dir.as_deref().map(|d| resolve_with_base(base, d))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingSettings {
    pub default_size: u64,
    pub max_size: u64,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self { default_size: 20, max_size: 2000 }
    }
}

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Load from the working directory, picking the env overlay from `RUST_ENV`.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(Path::new("."), &env_name)
    }

    pub fn load_for_env(base: &Path, env_name: &str) -> Result<Self> {
        let mut figment = Self::defaults().merge(Toml::file(base.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate()?;
        Ok(config)
    }

    /// Defaults overlaid with an inline TOML document. Environment variables
    /// are not consulted.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let config = Self { figment: Self::defaults().merge(Toml::string(toml)) };
        config.validate()?;
        Ok(config)
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    pub fn settings(&self) -> Result<Settings> {
        self.figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        let settings = self.settings()?;
        let paging = &settings.paging;
        if paging.max_size == 0 {
            return Err(Error::InvalidConfig("paging.max_size must be positive".into()));
        }
        if paging.default_size == 0 || paging.default_size > paging.max_size {
            return Err(Error::InvalidConfig(format!(
                "paging.default_size must be in 1..={}, got {}",
                paging.max_size, paging.default_size
            )));
        }
        if settings.index.writer_heap_bytes < 15_000_000 {
            return Err(Error::InvalidConfig("index.writer_heap_bytes must be at least 15000000".into()));
        }
        Ok(())
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

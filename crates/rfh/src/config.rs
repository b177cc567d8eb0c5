//! Loads `rfh.toml`: a `current` registry selector plus one `[registries.*]`
//! table per configured registry, resolved into `rulestack_registry::RegistryConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use rulestack_registry::{RegistryConfig, RegistryType};
use secrecy::SecretString;
use serde::Deserialize;

pub const CONFIG_FILE: &str = "rfh.toml";

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub struct RfhConfig {
    pub current: Option<String>,
    #[serde(default, rename = "registries")]
    pub registries: BTreeMap<String, RegistryEntry>,
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct RegistryEntry {
    pub url: String,
    #[serde(rename = "type")]
    pub registry_type: Option<RegistryType>,
    pub token: Option<String>,
}

impl RfhConfig {
    /// Loads `rfh.toml` from `path` if it exists, otherwise returns an empty
    /// configuration -- a missing config file is not an error, since `rfh
    /// init` does not require one until the first `add`/`publish`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        match fs_err::read_to_string(path) {
            Ok(raw) => toml::from_str(&raw).with_context(|| format!("invalid config file {path:?}")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("can't read {path:?}")),
        }
    }

    /// Resolves `name` (or, if unset, `current`, or, if that's unset too, the
    /// sole configured registry) to a usable [`RegistryConfig`].
    pub fn resolve(&self, name: Option<&str>) -> anyhow::Result<RegistryConfig> {
        let key = match name.or(self.current.as_deref()) {
            Some(key) => key.to_string(),
            None => match self.registries.len() {
                1 => self.registries.keys().next().cloned().expect("len checked above"),
                0 => bail!(
                    "no registry configured; add a [registries.<name>] table to {CONFIG_FILE} or pass --registry"
                ),
                _ => bail!(
                    "multiple registries configured in {CONFIG_FILE} and none is selected; pass --registry or run `rfh config use <name>`"
                ),
            },
        };

        let entry = self
            .registries
            .get(&key)
            .with_context(|| format!("no registry named '{key}' in {CONFIG_FILE}"))?;

        let token = entry
            .token
            .clone()
            .or_else(|| match entry.registry_type {
                Some(RegistryType::Git) => std::env::var("RFH_GIT_TOKEN").ok(),
                _ => std::env::var("RFH_TOKEN").ok(),
            })
            .map(SecretString::from);

        Ok(RegistryConfig {
            url: entry.url.clone(),
            registry_type: entry.registry_type,
            token,
            verbose: false,
        })
    }

    /// Sets `current` to `name` and writes the file back, failing if `name`
    /// is not a configured registry.
    pub fn use_registry(path: &Path, name: &str) -> anyhow::Result<()> {
        let mut config = Self::load(path)?;
        if !config.registries.contains_key(name) {
            bail!("no registry named '{name}' in {CONFIG_FILE}");
        }
        config.current = Some(name.to_string());
        let raw = toml::to_string_pretty(&config).context("failed to serialize config")?;
        fs_err::write(path, raw).with_context(|| format!("failed to write {path:?}"))
    }
}

#[must_use]
pub fn default_config_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}

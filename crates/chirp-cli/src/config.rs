use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chirp_crypto::SigningKey;
use chirp_store::{FileStoreConfig, SyncMode};
use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "chirp.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub store_path: PathBuf,
    pub keypair_path: PathBuf,
    pub sync_mode: SyncMode,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("chirp.log"),
            keypair_path: PathBuf::from("chirp.key"),
            sync_mode: SyncMode::OsDefault,
            log_level: "info".into(),
        }
    }
}

impl ClientConfig {
    /// Load from `path`, or from `chirp.toml` if it exists, or use defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn store_config(&self) -> FileStoreConfig {
        FileStoreConfig {
            sync_mode: self.sync_mode,
        }
    }

    /// The configured log level; unknown values fall back to `info`.
    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }

    pub fn load_keypair(&self) -> anyhow::Result<SigningKey> {
        let text = fs::read_to_string(&self.keypair_path).with_context(|| {
            format!(
                "reading key {} (run `chirp keygen` first)",
                self.keypair_path.display()
            )
        })?;
        SigningKey::from_hex(&text)
            .with_context(|| format!("parsing key {}", self.keypair_path.display()))
    }
}

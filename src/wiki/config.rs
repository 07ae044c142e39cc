//! Store and site configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::storage::{Author, GitSignature};

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Options for opening a [`ContentStore`](super::ContentStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Path to the working tree.
    pub path: PathBuf,
    /// Extension appended to every title, without the dot.
    pub extension: String,
    /// Initialize the repository if it doesn't exist.
    pub create_if_missing: bool,
    /// Identity used for commits without an explicit author.
    pub signature: GitSignature,
    /// The git executable to run.
    pub git_program: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
            extension: "md".to_string(),
            create_if_missing: true,
            signature: GitSignature::wiki(),
            git_program: PathBuf::from("git"),
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Set the document file extension.
    pub fn extension(mut self, value: impl Into<String>) -> Self {
        self.extension = value.into();
        self
    }

    /// Set create_if_missing flag.
    pub fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Set the default commit identity.
    pub fn signature(mut self, value: GitSignature) -> Self {
        self.signature = value;
        self
    }

    /// Set the git executable.
    pub fn git_program(mut self, value: impl Into<PathBuf>) -> Self {
        self.git_program = value.into();
        self
    }

    /// Check the values make sense before touching the filesystem.
    pub fn validate(&self) -> ConfigResult<()> {
        let ext = self.extension.as_str();
        if ext.is_empty() || ext.starts_with('.') || ext.contains(&['/', '\\', ':'][..]) {
            return Err(ConfigError::Invalid(format!("bad file extension {:?}", ext)));
        }
        Ok(())
    }
}

/// A wiki user, as listed under `[[users]]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub email: String,
    pub username: String,
    /// Carried for the auth layer; never interpreted here.
    pub password: String,
}

/// Site configuration read from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub index_page: String,
    pub file_extension: String,
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
    pub table_class: String,
    pub users: Vec<User>,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            name: "Wiki".to_string(),
            host: "0.0.0.0".to_string(),
            port: 4567,
            data_dir: PathBuf::from("./data"),
            index_page: "FrontPage".to_string(),
            file_extension: "md".to_string(),
            template_dir: PathBuf::new(),
            static_dir: PathBuf::new(),
            table_class: String::new(),
            users: Vec::new(),
        }
    }
}

impl WikiConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&data)
    }

    /// Parse configuration from TOML text; missing keys take defaults.
    pub fn from_toml_str(data: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(data)?;
        if let Some(dup) = config.duplicate_username() {
            return Err(ConfigError::Invalid(format!("duplicate username {:?}", dup)));
        }
        Ok(config)
    }

    fn duplicate_username(&self) -> Option<&str> {
        self.users.iter().enumerate().find_map(|(i, user)| {
            self.users[..i]
                .iter()
                .any(|prev| prev.username == user.username)
                .then_some(user.username.as_str())
        })
    }

    /// Look up a configured user by login name.
    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// The commit author for a login, or the empty author if unknown.
    pub fn author_for(&self, username: &str) -> Author {
        self.user(username)
            .map(|u| Author::new(&u.name, &u.email))
            .unwrap_or_default()
    }

    /// Store options derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.data_dir).extension(&self.file_extension)
    }
}

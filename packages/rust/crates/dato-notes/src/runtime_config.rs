//! Site configuration: defaults, optional YAML file, then environment.

use crate::feeds::{FeedOptions, normalize_site_url};
use crate::note_index::{
    DEFAULT_LONG_FORM_MIN_WORDS, DEFAULT_SEARCH_CONTENT_PREFIX_CHARS, IndexOptions,
};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "dato.yaml";

pub(crate) const NOTES_DIR_ENV: &str = "DATO_NOTES_DIR";
pub(crate) const SITE_URL_ENV: &str = "SITE_URL";
pub(crate) const PUBLIC_SITE_URL_ENV: &str = "NEXT_PUBLIC_SITE_URL";
pub(crate) const ADMIN_TOKEN_ENV: &str = "ADMIN_TOKEN";
pub(crate) const ADMIN_USER_ENV: &str = "ADMIN_USER";
pub(crate) const ADMIN_PASS_ENV: &str = "ADMIN_PASS";
pub(crate) const BIND_ENV: &str = "DATO_BIND";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config '{}': {source}", path.display())]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file is not valid YAML for [`SiteConfig`].
    #[error("invalid config '{}': {message}", path.display())]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

/// Resolved site settings shared by the CLI and the HTTP gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Directory holding the `.md` notes.
    pub notes_dir: PathBuf,
    /// Word count at which untyped notes become long-form.
    pub long_form_min_words: usize,
    /// Content characters folded into `searchText`.
    pub search_content_prefix_chars: usize,
    /// Public origin used in feeds.
    pub site_url: String,
    /// RSS channel title.
    pub feed_title: String,
    /// RSS channel description.
    pub feed_description: String,
    /// Gateway listen address.
    pub bind: String,
    /// Shared secret for admin routes.
    pub admin_token: Option<String>,
    /// Basic auth user for admin routes.
    pub admin_user: Option<String>,
    /// Basic auth password for admin routes.
    pub admin_pass: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let feed = FeedOptions::default();
        Self {
            notes_dir: PathBuf::from("content/notes"),
            long_form_min_words: DEFAULT_LONG_FORM_MIN_WORDS,
            search_content_prefix_chars: DEFAULT_SEARCH_CONTENT_PREFIX_CHARS,
            site_url: feed.site_url,
            feed_title: feed.title,
            feed_description: feed.description,
            bind: "127.0.0.1:3000".to_string(),
            admin_token: None,
            admin_user: None,
            admin_pass: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

impl SiteConfig {
    /// Index tunables.
    #[must_use]
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            long_form_min_words: self.long_form_min_words,
            search_content_prefix_chars: self.search_content_prefix_chars,
        }
    }

    /// RSS channel metadata.
    #[must_use]
    pub fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            site_url: normalize_site_url(&self.site_url),
            title: self.feed_title.clone(),
            description: self.feed_description.clone(),
        }
    }

    /// Overlay values from `lookup` (an environment reader); empty values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| non_empty(lookup(key));
        if let Some(dir) = read(NOTES_DIR_ENV) {
            self.notes_dir = PathBuf::from(dir);
        }
        if let Some(url) = read(SITE_URL_ENV).or_else(|| read(PUBLIC_SITE_URL_ENV)) {
            self.site_url = url;
        }
        if let Some(bind) = read(BIND_ENV) {
            self.bind = bind;
        }
        if let Some(token) = read(ADMIN_TOKEN_ENV) {
            self.admin_token = Some(token);
        }
        if let Some(user) = read(ADMIN_USER_ENV) {
            self.admin_user = Some(user);
        }
        if let Some(pass) = read(ADMIN_PASS_ENV) {
            self.admin_pass = Some(pass);
        }
    }

    /// Overlay the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    fn normalize(mut self) -> Self {
        self.site_url = normalize_site_url(&self.site_url);
        self.admin_token = non_empty(self.admin_token);
        self.admin_user = non_empty(self.admin_user);
        self.admin_pass = non_empty(self.admin_pass);
        self
    }

    /// Defaults deep-merged with one YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the YAML is invalid or has wrong value types.
    pub fn from_yaml_str(path: &Path, yaml: &str) -> Result<Self, ConfigError> {
        let parse_err = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        let mut merged =
            serde_yaml::to_value(Self::default()).map_err(|err| parse_err(err.to_string()))?;
        if !yaml.trim().is_empty() {
            let overlay =
                serde_yaml::from_str::<Value>(yaml).map_err(|err| parse_err(err.to_string()))?;
            match overlay {
                Value::Null => {}
                Value::Mapping(_) => deep_merge(&mut merged, overlay),
                _ => return Err(parse_err("config root must be a mapping".to_string())),
            }
        }
        serde_yaml::from_value::<Self>(merged)
            .map(Self::normalize)
            .map_err(|err| parse_err(err.to_string()))
    }
}

fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    deep_merge(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

/// Load the site config: defaults, then `conf` (or `./dato.yaml` when present),
/// then environment variables.
///
/// # Errors
///
/// Returns [`ConfigError`] when an explicitly given file is unreadable or any
/// config file is invalid.
pub fn load_site_config(conf: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let mut config = match conf {
        Some(path) => read_config_file(path)?,
        None => {
            let implicit = Path::new(DEFAULT_CONFIG_FILE);
            if implicit.is_file() {
                read_config_file(implicit)?
            } else {
                SiteConfig::default()
            }
        }
    };
    config.apply_env();
    let config = config.normalize();
    log::debug!(
        "site config resolved: notes_dir='{}' site_url='{}'",
        config.notes_dir.display(),
        config.site_url
    );
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SiteConfig::from_yaml_str(path, &content)
}

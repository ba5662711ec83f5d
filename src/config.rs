use serde::Deserialize;
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Alertmanager URL used when no valid one is configured
pub const DEFAULT_ALERTMANAGER_URL: &str = "http://127.0.0.1:9093";

/// System-wide config location, searched first
pub const SYSTEM_CONFIG_PATH: &str = "/etc/am-silence-ctl/config.yaml";

/// File name of the per-user config inside the home directory
pub const USER_CONFIG_FILE: &str = ".am-silence-ctl.yaml";

/// Config locations searched when no explicit path is given, in order
pub fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(home) = dirs::home_dir() {
        locations.push(home.join(USER_CONFIG_FILE));
    }
    locations
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    alertmanager_url: Option<Value>,
    #[serde(default)]
    role: Option<Value>,
    #[serde(default)]
    group: Option<Value>,
}

/// Tool configuration
///
/// Every key is optional in the YAML file:
///
/// ```yaml
/// alertmanager_url: http://alertmanager.example.com:9093
/// role: database
/// group: payments
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the Alertmanager instance, without trailing slash
    pub alertmanager_url: String,
    /// Default value for `--role` given without a value
    pub role: Option<String>,
    /// Default value for `--group` given without a value
    pub group: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alertmanager_url: DEFAULT_ALERTMANAGER_URL.to_string(),
            role: None,
            group: None,
        }
    }
}

impl Config {
    /// Load the configuration
    ///
    /// Uses `path` when given, otherwise searches [`default_locations`].
    /// Never fails: unreadable or invalid files are logged and skipped,
    /// and defaults are returned when nothing usable is found.
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => {
                let path = expand_home(path);
                if !path.is_file() {
                    warn!(path = %path.display(), "Config file not found; using defaults");
                    return Self::default();
                }
                Self::load_first(&[path])
            }
            None => Self::load_first(&default_locations()),
        }
    }

    /// Load the first file in `locations` that exists and parses
    #[instrument(name = "Config::load_first", skip_all, fields(candidates = locations.len()))]
    pub fn load_first(locations: &[PathBuf]) -> Self {
        for path in locations {
            if !path.is_file() {
                debug!(path = %path.display(), "No config file");
                continue;
            }

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to read config");
                    continue;
                }
            };

            match Self::from_yaml_str(&content, path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded config");
                    return config;
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to parse config");
                }
            }
        }

        Self::default()
    }

    /// Parse YAML config text
    ///
    /// An `alertmanager_url` without scheme or host is logged and replaced by
    /// the default. `source` is only used in log messages.
    pub fn from_yaml_str(content: &str, source: &Path) -> Result<Self, serde_yaml::Error> {
        let mut config = Self::default();
        if content.trim().is_empty() {
            return Ok(config);
        }

        let raw = serde_yaml::from_str::<Option<RawConfig>>(content)?.unwrap_or_default();

        if let Some(url) = raw.alertmanager_url.as_ref().and_then(scalar_to_string) {
            if is_valid_base_url(&url) {
                config.alertmanager_url = url.trim_end_matches('/').to_string();
            } else {
                error!(
                    path = %source.display(),
                    alertmanager_url = %url,
                    "Invalid 'alertmanager_url' (ignored)"
                );
            }
        }
        config.role = raw.role.as_ref().and_then(scalar_to_string);
        config.group = raw.group.as_ref().and_then(scalar_to_string);

        Ok(config)
    }
}

/// A base URL is usable when it has both a scheme and a host
fn is_valid_base_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| !url.scheme().is_empty() && url.has_host())
        .unwrap_or(false)
}

/// String form of a YAML scalar
///
/// Falsy values (null, `false`, zero, empty string) and collections yield
/// `None`; `true` renders as `True`.
fn scalar_to_string(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => return None,
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "True".to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

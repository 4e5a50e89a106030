//! Study configuration loaded from `~/.reframe/config.toml`.
//!
//! Every field is optional: a bare binary runs against localhost defaults so
//! a study machine only needs a config file to point at real endpoints or to
//! change the unlock threshold.

use std::time::Duration;
use std::{env, fs, path::{Path, PathBuf}};

use serde::Deserialize;
use thiserror::Error;

use reframe_client::{DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Documented unlock threshold for the late windows: five minutes.
pub const DEFAULT_UNLOCK_AFTER_SECS: u64 = 300;

#[derive(Debug, Default, Deserialize)]
pub struct StudyConfig {
    pub study: Option<StudySection>,
    pub backend: Option<BackendSection>,
    pub problems: Option<ProblemsSection>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StudySection {
    /// Experimental condition token; CLI flag and environment take precedence.
    pub condition: Option<String>,
    /// Seconds before windows D and E unlock.
    pub unlock_after_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackendSection {
    /// Base URL of the generation service.
    pub base_url: Option<String>,
    /// Bound on a single generation round trip, in seconds.
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize)]
pub struct ProblemsSection {
    /// Endpoint returning the ordered `{id, text}` problem records.
    pub url: Option<String>,
    pub api_key: Option<String>,
}

// Manual Debug impl to keep the API key out of logs.
impl std::fmt::Debug for ProblemsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProblemsSection")
            .field("url", &self.url)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl StudyConfig {
    /// Location of the config file, honoring a `REFRAME_CONFIG` override.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        if let Ok(path) = env::var("REFRAME_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(".reframe").join("config.toml"))
    }

    /// Load the config file if one exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = Self::path() else {
            return Ok(None);
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    #[must_use]
    pub fn condition_token(&self) -> Option<&str> {
        self.study.as_ref()?.condition.as_deref()
    }

    #[must_use]
    pub fn unlock_threshold(&self) -> Duration {
        let secs = self
            .study
            .as_ref()
            .and_then(|s| s.unlock_after_secs)
            .unwrap_or(DEFAULT_UNLOCK_AFTER_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn backend_url(&self) -> &str {
        self.backend
            .as_ref()
            .and_then(|b| b.base_url.as_deref())
            .unwrap_or(DEFAULT_BACKEND_URL)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .backend
            .as_ref()
            .and_then(|b| b.timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn problems_url(&self) -> Option<&str> {
        self.problems.as_ref()?.url.as_deref()
    }

    #[must_use]
    pub fn problems_api_key(&self) -> Option<&str> {
        self.problems.as_ref()?.api_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_without_config() {
        let config = StudyConfig::default();
        assert_eq!(config.unlock_threshold(), Duration::from_secs(300));
        assert_eq!(config.backend_url(), DEFAULT_BACKEND_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.condition_token(), None);
        assert_eq!(config.problems_url(), None);
    }

    #[test]
    fn parses_full_config() {
        let raw = r#"
            [study]
            condition = "llm_later"
            unlock_after_secs = 10

            [backend]
            base_url = "http://study-backend:8000"
            timeout_secs = 15

            [problems]
            url = "http://study-backend:8000/problems"
            api_key = "anon-key"
        "#;
        let config: StudyConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.condition_token(), Some("llm_later"));
        assert_eq!(config.unlock_threshold(), Duration::from_secs(10));
        assert_eq!(config.backend_url(), "http://study-backend:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
        assert_eq!(config.problems_api_key(), Some("anon-key"));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(StudyConfig::load_from(&path).unwrap().is_none());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[study").unwrap();
        assert!(matches!(
            StudyConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let section = ProblemsSection {
            url: Some("http://host/problems".to_string()),
            api_key: Some("secret".to_string()),
        };
        let rendered = format!("{section:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("REDACTED"));
    }
}

//! Profile management
//!
//! A profile names one Swift account: its storage URL, the token used to
//! talk to it and transport settings.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigManager;
use crate::error::{Error, Result};
use crate::token::Token;

/// Timeout configuration for a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,

    /// Whole-request timeout in milliseconds
    #[serde(default = "default_read_timeout")]
    pub read_ms: u64,
}

fn default_connect_timeout() -> u64 {
    5000
}

fn default_read_timeout() -> u64 {
    60000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_timeout(),
            read_ms: default_read_timeout(),
        }
    }
}

/// A named Swift account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,

    /// Storage URL of the account, e.g. `https://swift.example.com/v1/AUTH_demo`
    pub endpoint: String,

    /// Auth token sent as `X-Auth-Token`
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<Timestamp>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<TimeoutConfig>,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            token: token.into(),
            token_expires_at: None,
            insecure: false,
            timeout: None,
        }
    }

    /// Token built from the stored id and expiry
    pub fn token(&self) -> Token {
        match self.token_expires_at {
            Some(expires_at) => Token::with_expiry(&self.token, expires_at),
            None => Token::new(&self.token),
        }
    }

    /// Parsed storage URL
    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(Error::Config(format!(
                "Unsupported endpoint scheme '{other}' for profile '{}'",
                self.name
            ))),
        }
    }

    /// Get the effective timeout configuration
    pub fn timeout_config(&self) -> TimeoutConfig {
        self.timeout.unwrap_or_default()
    }
}

/// Manager for profile operations
pub struct ProfileManager {
    config_manager: ConfigManager,
}

impl ProfileManager {
    pub fn with_config_manager(config_manager: ConfigManager) -> Self {
        Self { config_manager }
    }

    /// Create a ProfileManager using the default config location
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_manager: ConfigManager::new()?,
        })
    }

    pub fn list(&self) -> Result<Vec<Profile>> {
        Ok(self.config_manager.load()?.profiles)
    }

    pub fn get(&self, name: &str) -> Result<Profile> {
        self.config_manager
            .load()?
            .profiles
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
    }

    /// Add or replace a profile
    ///
    /// The endpoint is validated before anything is written.
    pub fn set(&self, profile: Profile) -> Result<()> {
        profile.endpoint_url()?;

        let mut config = self.config_manager.load()?;
        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);
        self.config_manager.save(&config)
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        let mut config = self.config_manager.load()?;
        let before = config.profiles.len();
        config.profiles.retain(|p| p.name != name);

        if config.profiles.len() == before {
            return Err(Error::ProfileNotFound(name.to_string()));
        }
        self.config_manager.save(&config)
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .config_manager
            .load()?
            .profiles
            .iter()
            .any(|p| p.name == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;
    use tempfile::TempDir;

    fn temp_profile_manager() -> (ProfileManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_manager = ConfigManager::with_path(temp_dir.path().join("config.toml"));
        (ProfileManager::with_config_manager(config_manager), temp_dir)
    }

    fn demo(name: &str) -> Profile {
        Profile::new(name, "https://swift.local/v1/AUTH_demo", "AUTH_tk123")
    }

    #[test]
    fn test_profile_token_expiry() {
        let mut profile = demo("prod");
        assert!(profile.token().is_valid());

        profile.token_expires_at = Some(Timestamp::now() - 1.hour());
        assert!(!profile.token().is_valid());
        assert_eq!(profile.token().id(), "AUTH_tk123");
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(demo("ok").endpoint_url().is_ok());

        let bad_scheme = Profile::new("ftp", "ftp://swift.local/v1/AUTH_demo", "t");
        assert!(matches!(bad_scheme.endpoint_url(), Err(Error::Config(_))));

        let garbage = Profile::new("junk", "not a url", "t");
        assert!(matches!(garbage.endpoint_url(), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_manager_set_get_remove() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(demo("prod")).unwrap();
        assert_eq!(manager.get("prod").unwrap().token, "AUTH_tk123");
        assert!(manager.exists("prod").unwrap());

        manager.remove("prod").unwrap();
        assert!(!manager.exists("prod").unwrap());
        assert!(matches!(
            manager.remove("prod"),
            Err(Error::ProfileNotFound(_))
        ));
    }

    #[test]
    fn test_manager_replaces_existing() {
        let (manager, _temp_dir) = temp_profile_manager();

        manager.set(demo("prod")).unwrap();
        let mut updated = demo("prod");
        updated.token = "AUTH_new".into();
        manager.set(updated).unwrap();

        let profiles = manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].token, "AUTH_new");
    }

    #[test]
    fn test_manager_rejects_invalid_endpoint() {
        let (manager, _temp_dir) = temp_profile_manager();
        assert!(manager.set(Profile::new("bad", "::", "t")).is_err());
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn test_get_missing_profile() {
        let (manager, _temp_dir) = temp_profile_manager();
        assert!(matches!(
            manager.get("nope"),
            Err(Error::ProfileNotFound(ref name)) if name == "nope"
        ));
    }
}

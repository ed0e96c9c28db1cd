use std::{
    collections::HashMap,
    fmt::Debug,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::error::{TrackerError, TrackerResult};

pub const TOKEN_KEY: &str = "GITHUB_TOKEN";
pub const OWNER_KEY: &str = "GITHUB_OWNER";
pub const REPO_KEY: &str = "GITHUB_REPO";
pub const USERNAME_KEY: &str = "GITHUB_USERNAME";
pub const OUTPUT_KEY: &str = "TRACKER_XLSX";
pub const SHEET_KEY: &str = "TRACKER_SHEET";
pub const TIMEZONE_KEY: &str = "TRACKER_TIMEZONE";

/// Anything that can hand out string settings by key. The process environment is the one used by
/// the binary, maps are handy for tests.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment.
pub struct EnvSource;

impl EnvSource {
    /// Loads `env_file` into the environment (if it exists) and returns the source. Variables that
    /// are already set are not overridden.
    pub fn with_dotenv(env_file: Option<&Path>) -> Self {
        match env_file {
            Some(path) => match dotenvy::from_path(path) {
                Ok(()) => debug!("Loaded environment from {path:?}"),
                Err(e) => warn!("Could not load env file {path:?}: {e}"),
            },
            None => match dotenvy::dotenv() {
                Ok(path) => debug!("Loaded environment from {path:?}"),
                Err(e) => debug!("No .env file loaded: {e}"),
            },
        }
        Self
    }
}

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Settings for one run. Built once and passed around by reference.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub username: String,
    pub output_path: PathBuf,
    pub sheet_name: String,
    pub timezone: String,
}

impl Config {
    /// Reads every required key. Fails with the full list of absent or blank keys so the user can
    /// fix all of them at once.
    pub fn load(source: &impl ConfigSource) -> TrackerResult<Self> {
        let mut missing = Vec::new();
        let mut take = |key: &'static str| match source.get(key) {
            Some(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => {
                missing.push(key);
                String::new()
            }
        };

        let token = take(TOKEN_KEY);
        let owner = take(OWNER_KEY);
        let repo = take(REPO_KEY);
        let username = take(USERNAME_KEY);
        let output_path = take(OUTPUT_KEY);
        let sheet_name = take(SHEET_KEY);
        let timezone = take(TIMEZONE_KEY);

        if !missing.is_empty() {
            return Err(TrackerError::Config { missing });
        }

        Ok(Self {
            token,
            owner,
            repo,
            username,
            output_path: PathBuf::from(output_path),
            sheet_name,
            timezone,
        })
    }

    /// `owner/repo`, the form GitHub uses in event payloads and search queries.
    pub fn full_repo_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("username", &self.username)
            .field("output_path", &self.output_path)
            .field("sheet_name", &self.sheet_name)
            .field("timezone", &self.timezone)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use crate::error::TrackerError;

    use super::*;

    pub(crate) fn full_source() -> HashMap<String, String> {
        [
            (TOKEN_KEY, "ghp_secret"),
            (OWNER_KEY, "ansible-collections"),
            (REPO_KEY, "azure"),
            (USERNAME_KEY, "octocat"),
            (OUTPUT_KEY, "tracker.xlsx"),
            (SHEET_KEY, "Ansible.Azcollection"),
            (TIMEZONE_KEY, "Asia/Kuala_Lumpur"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_load_full() {
        let config = Config::load(&full_source()).unwrap();
        assert_eq!(config.full_repo_name(), "ansible-collections/azure");
        assert_eq!(config.output_path, PathBuf::from("tracker.xlsx"));
        assert_eq!(config.sheet_name, "Ansible.Azcollection");
    }

    #[test]
    fn test_load_reports_every_missing_key() {
        let mut source = full_source();
        source.remove(TOKEN_KEY);
        source.insert(SHEET_KEY.to_string(), "   ".to_string());

        match Config::load(&source) {
            Err(TrackerError::Config { missing }) => {
                assert_eq!(missing, vec![TOKEN_KEY, SHEET_KEY]);
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let config = Config::load(&full_source()).unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("octocat"));
    }
}

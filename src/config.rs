use crate::errors::Result;
use git2::ErrorCode;

pub const SECTION: &str = "branch-pr-status";

pub const DEFAULT_IGNORED_BRANCHES: [&str; 3] = ["main", "master", "develop"];
pub const DEFAULT_REMOTE: &str = "origin";
pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Defaults read from the `[branch-pr-status]` section of git config
///
/// Command line flags take precedence over every value here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub ignored_branches: Option<Vec<String>>,
    pub align: bool,
    pub remote: Option<String>,
    pub api_url: Option<String>,
    pub host: Option<String>,
}

impl Config {
    pub fn from_git(config: &git2::Config) -> Result<Self> {
        let ignored_branches = optional(config.get_string(&key("ignoredBranches")))?.map(|value| {
            value
                .split_whitespace()
                .map(|name| name.to_string())
                .collect()
        });

        Ok(Self {
            ignored_branches,
            align: optional(config.get_bool(&key("align")))?.unwrap_or(false),
            remote: optional(config.get_string(&key("remote")))?,
            api_url: optional(config.get_string(&key("apiUrl")))?,
            host: optional(config.get_string(&key("host")))?,
        })
    }

    pub fn ignored_branches(&self) -> Vec<String> {
        match &self.ignored_branches {
            Some(branches) => branches.clone(),
            None => DEFAULT_IGNORED_BRANCHES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }

    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}

fn key(name: &str) -> String {
    format!("{}.{}", SECTION, name)
}

// Missing keys are not an error
fn optional<T>(value: std::result::Result<T, git2::Error>) -> Result<Option<T>> {
    match value {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

use crate::{
    config::Config,
    errors::{AppError, Result},
};
use git2::{BranchType, ErrorCode, Repository};
use regex::Regex;
use std::{collections::HashMap, path::Path};

pub struct Git {
    pub repository: Repository,
    pub config: Config,
}

impl Git {
    /// Open the repository containing `path`, with the tool's git config loaded
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repository = Repository::discover(path).map_err(|e| {
            log::debug!("Cannot open repository at {}: {}", path.display(), e);
            AppError::NotAGitRepository(path.display().to_string())
        })?;
        log::debug!("Opened repository at {}", repository.path().display());

        let config = Config::from_git(&repository.config()?)?;
        log::debug!("Loaded config: {:?}", config);

        Ok(Self { repository, config })
    }

    /// Resolve the `owner/name` identifier from the URL of the given remote
    pub fn repo_identifier(&self, remote: &str, host: &str) -> Result<String> {
        let remote = match self.repository.find_remote(remote) {
            Ok(remote) => remote,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(AppError::MissingRemote(remote.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let url = remote
            .url()
            .ok_or_else(|| AppError::UnrecognizedRemoteFormat(String::from_utf8_lossy(remote.url_bytes()).to_string()))?;

        let identifier = parse_repo_identifier(url, host)?;
        log::debug!("Remote {} ({}) resolved to {}", remote.name().unwrap_or_default(), url, identifier);
        Ok(identifier)
    }

    /// Map every local branch that is not ignored to the short hash of its tip
    pub fn list_branch_tips(&self, ignored: &[String]) -> Result<HashMap<String, String>> {
        let mut tips = HashMap::new();

        for branch in self.repository.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()?.map(|name| name.to_string()) else {
                log::debug!("Skipping branch with a non UTF-8 name");
                continue;
            };

            if ignored.contains(&name) {
                log::debug!("Ignoring branch {}", name);
                continue;
            }

            let commit = branch.get().peel_to_commit()?;
            let short_id = commit.as_object().short_id()?;
            let short_id = short_id
                .as_str()
                .map(|id| id.to_string())
                .unwrap_or_else(|| commit.id().to_string());

            log::debug!("Branch {} points to {}", name, short_id);
            tips.insert(name, short_id);
        }

        Ok(tips)
    }
}

/// Extract `owner/name` from an SSH or HTTPS remote URL pointing at `host`
pub fn parse_repo_identifier(url: &str, host: &str) -> Result<String> {
    let host = regex::escape(host);
    let pattern = format!(
        r"^(?:(?:ssh://)?(?:[^@/\s]+@)?{host}[:/]|https?://(?:[^@/\s]+@)?{host}(?::\d+)?/)(?P<owner>[^/\s]+)/(?P<name>[^/\s]+?)(?:\.git)?/?$"
    );
    let re = Regex::new(&pattern).map_err(|_| AppError::UnrecognizedRemoteFormat(url.to_string()))?;

    let caps = re
        .captures(url.trim())
        .ok_or_else(|| AppError::UnrecognizedRemoteFormat(url.to_string()))?;

    Ok(format!("{}/{}", &caps["owner"], &caps["name"]))
}

use crate::{
    credentials::{CredentialStore, Credentials, KeyringStore, SecretStore},
    errors::{AppError, Result},
    git::Git,
    github::{Forge, GitHubApi},
    prompt::{Prompt, TerminalPrompt},
    report::{align_width, format_found, format_not_found, Style},
};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct Status {
    /// Path to a local git working directory
    pub repository: PathBuf,

    /// GitHub user name, skips the keyring
    #[arg(short, long, requires = "token")]
    pub user: Option<String>,

    /// GitHub personal access token, skips the keyring
    #[arg(short, long, requires = "user")]
    pub token: Option<String>,

    /// Pad branch names so that statuses line up
    #[arg(long)]
    pub align: bool,

    /// Branches left out of the report [default: main master develop]
    #[arg(long, num_args = 0..)]
    pub ignored_branches: Option<Vec<String>>,

    /// Print commit, title and URL of each pull request
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Remote used to find the GitHub repository [default: origin]
    #[arg(long)]
    pub remote: Option<String>,

    /// GitHub API base URL [default: https://api.github.com]
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
}

/// Where the credentials of this run come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Flags,
    Stored,
    Prompted,
}

impl Status {
    pub fn execute(&self) -> Result<()> {
        let git = Git::open(&self.repository)?;
        let api_url = self
            .api_url
            .as_deref()
            .unwrap_or_else(|| git.config.api_url());
        let forge = GitHubApi::new(api_url)?;
        let store = CredentialStore::new(KeyringStore::new()?);

        let mut stdout = std::io::stdout().lock();
        self.run(&git, &forge, &store, &mut TerminalPrompt, &mut stdout)
    }

    /// Inspect the repository, log in once, then report every branch
    ///
    /// Nothing is written to `out` unless every branch could be queried.
    pub fn run<F, S, P, W>(
        &self,
        git: &Git,
        forge: &F,
        store: &CredentialStore<S>,
        prompt: &mut P,
        out: &mut W,
    ) -> Result<()>
    where
        F: Forge,
        S: SecretStore,
        P: Prompt,
        W: Write,
    {
        // Repository problems must surface before any network call
        let remote = self.remote.as_deref().unwrap_or_else(|| git.config.remote());
        let repo = git.repo_identifier(remote, git.config.host())?;
        let tips = git.list_branch_tips(&self.ignored_branches(git))?;

        let (credentials, source) = self.credentials(store, prompt)?;

        let session = match forge.authenticate(&credentials) {
            Ok(session) => session,
            Err(AppError::InvalidCredentials) => {
                if source == CredentialSource::Stored {
                    store.remove(|| prompt.confirm("Login failed. Remove credentials from keyring?"))?;
                }
                return Err(AppError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if source == CredentialSource::Prompted {
            // The report does not depend on the cache
            if let Err(e) = store.save(&credentials, || prompt.confirm("Login ok. Store credentials in keyring?")) {
                log::warn!("Cannot store credentials: {}", e);
            }
        }

        let style = Style {
            align_to: (self.align || git.config.align).then(|| align_width(tips.keys())),
            verbose: self.verbose,
            color: !self.no_color,
        };

        let mut branches: Vec<(&String, &String)> = tips.iter().collect();
        branches.sort();

        let mut lines = Vec::with_capacity(branches.len());
        for (branch, commit) in branches {
            let line = match forge.find_pull_request_for_commit(&session, &repo, commit)? {
                Some(status) => format_found(commit, branch, &status, &style),
                None => format_not_found(commit, branch, &style),
            };
            lines.push(line);
        }

        for line in lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()?;

        Ok(())
    }

    fn ignored_branches(&self, git: &Git) -> Vec<String> {
        match &self.ignored_branches {
            Some(branches) => branches.clone(),
            None => git.config.ignored_branches(),
        }
    }

    fn credentials<S, P>(
        &self,
        store: &CredentialStore<S>,
        prompt: &mut P,
    ) -> Result<(Credentials, CredentialSource)>
    where
        S: SecretStore,
        P: Prompt,
    {
        if let (Some(user), Some(token)) = (&self.user, &self.token) {
            return Ok((Credentials::new(user, token), CredentialSource::Flags));
        }

        if let Some(credentials) = store.load()? {
            log::debug!("Using stored credentials for {}", credentials.username);
            return Ok((credentials, CredentialSource::Stored));
        }

        let username = prompt.ask("Enter GitHub user name: ")?;
        let token = prompt.ask_secret("Enter personal access token: ")?;
        Ok((
            Credentials::new(username.trim(), token.trim()),
            CredentialSource::Prompted,
        ))
    }
}

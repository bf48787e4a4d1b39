use crate::credentials::Credentials;
use crate::errors::{AppError, Result};
use crate::github::{Forge, PullRequestStatus};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct MockForge {
    pub valid_token: String,
    pub pull_requests: HashMap<String, PullRequestStatus>,
    pub failing_commits: Vec<String>,
    pub logins: Mutex<Vec<Credentials>>,
    pub searches: Mutex<Vec<(String, String)>>,
}

impl MockForge {
    pub fn new(valid_token: &str) -> Self {
        Self {
            valid_token: valid_token.to_string(),
            pull_requests: HashMap::new(),
            failing_commits: Vec::new(),
            logins: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pull_request(mut self, commit: &str, status: PullRequestStatus) -> Self {
        self.pull_requests.insert(commit.to_string(), status);
        self
    }

    pub fn failing_on(mut self, commit: &str) -> Self {
        self.failing_commits.push(commit.to_string());
        self
    }

    pub fn get_logins(&self) -> Vec<Credentials> {
        self.logins.lock().unwrap().clone()
    }

    pub fn get_searches(&self) -> Vec<(String, String)> {
        self.searches.lock().unwrap().clone()
    }

    pub fn api_calls(&self) -> usize {
        self.get_logins().len() + self.get_searches().len()
    }
}

impl Forge for MockForge {
    type Session = ();

    fn authenticate(&self, credentials: &Credentials) -> Result<()> {
        self.logins.lock().unwrap().push(credentials.clone());
        if credentials.token != self.valid_token {
            return Err(AppError::InvalidCredentials);
        }
        Ok(())
    }

    fn find_pull_request_for_commit(
        &self,
        _session: &(),
        repo: &str,
        commit: &str,
    ) -> Result<Option<PullRequestStatus>> {
        self.searches
            .lock()
            .unwrap()
            .push((repo.to_string(), commit.to_string()));

        if self.failing_commits.iter().any(|c| c == commit) {
            return Err(AppError::Transport("connection reset".to_string()));
        }

        Ok(self.pull_requests.get(commit).cloned())
    }
}

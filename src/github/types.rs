use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestState {
    Open,
    Closed,
    Merged,
}

impl PullRequestState {
    /// Merged wins over closed, closed wins over open
    pub fn classify(merged: bool, state: ApiState) -> Self {
        if merged {
            PullRequestState::Merged
        } else if state == ApiState::Closed {
            PullRequestState::Closed
        } else {
            PullRequestState::Open
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PullRequestState::Open => "open",
            PullRequestState::Closed => "closed",
            PullRequestState::Merged => "merged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestStatus {
    pub state: PullRequestState,
    pub title: String,
    pub url: String,
}

// Wire types of the GitHub REST API

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiState {
    Open,
    Closed,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub login: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
    pub number: u64,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub state: ApiState,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub merged: bool,
}

impl From<PullRequest> for PullRequestStatus {
    fn from(pull: PullRequest) -> Self {
        PullRequestStatus {
            state: PullRequestState::classify(pull.merged, pull.state),
            title: pull.title,
            url: pull.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("'{0}' is not a git repository")]
    NotAGitRepository(String),

    #[error("Remote '{0}' not found")]
    MissingRemote(String),

    #[error("Unrecognized remote URL format: {0}")]
    UnrecognizedRemoteFormat(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Login to GitHub API failed: invalid credentials")]
    InvalidCredentials,

    #[error("GitHub API request failed: {0}")]
    Transport(String),

    #[error("Secret store operation failed: {0}")]
    SecretStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

impl From<keyring::Error> for AppError {
    fn from(e: keyring::Error) -> Self {
        AppError::SecretStore(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

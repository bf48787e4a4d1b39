pub mod api;
pub mod types;

#[cfg(test)]
pub mod mock;

pub use api::{Forge, GitHubApi};
pub use types::{PullRequestState, PullRequestStatus};

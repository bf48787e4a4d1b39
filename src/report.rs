use crate::github::{PullRequestState, PullRequestStatus};
use colored::Colorize;

pub const NOT_FOUND: &str = "-";

#[derive(Debug, Clone, Copy, Default)]
pub struct Style {
    /// Column at which the status token starts
    pub align_to: Option<usize>,
    pub verbose: bool,
    pub color: bool,
}

/// Longest branch name plus one
pub fn align_width<'a>(branches: impl IntoIterator<Item = &'a String>) -> usize {
    branches
        .into_iter()
        .map(|branch| branch.chars().count())
        .max()
        .map_or(0, |longest| longest + 1)
}

pub fn format_found(commit: &str, branch: &str, status: &PullRequestStatus, style: &Style) -> String {
    let state = state_label(status.state, style);

    if style.verbose {
        format!(
            "{} {}'{}', {}, {}",
            commit,
            branch_column(branch, style),
            status.title,
            state,
            status.url
        )
    } else {
        format!("{}{}", branch_column(branch, style), state)
    }
}

pub fn format_not_found(commit: &str, branch: &str, style: &Style) -> String {
    if style.verbose {
        format!("{} {}{}", commit, branch_column(branch, style), NOT_FOUND)
    } else {
        format!("{}{}", branch_column(branch, style), NOT_FOUND)
    }
}

// Branch name followed by at least one space
fn branch_column(branch: &str, style: &Style) -> String {
    match style.align_to {
        Some(width) if branch.chars().count() < width => format!("{:<width$}", branch, width = width),
        _ => format!("{} ", branch),
    }
}

fn state_label(state: PullRequestState, style: &Style) -> String {
    if !style.color {
        return state.label().to_string();
    }

    match state {
        PullRequestState::Open => state.label().red().to_string(),
        PullRequestState::Closed => state.label().yellow().to_string(),
        PullRequestState::Merged => state.label().green().to_string(),
    }
}

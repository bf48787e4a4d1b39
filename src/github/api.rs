use crate::credentials::Credentials;
use crate::errors::{AppError, Result};
use crate::github::types::{ApiMessage, PullRequest, PullRequestStatus, SearchResults, User};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A hosted git service that can tell which pull request a commit belongs to
pub trait Forge {
    type Session;

    fn authenticate(&self, credentials: &Credentials) -> Result<Self::Session>;

    fn find_pull_request_for_commit(
        &self,
        session: &Self::Session,
        repo: &str,
        commit: &str,
    ) -> Result<Option<PullRequestStatus>>;
}

pub struct Session {
    credentials: Credentials,
    login: String,
}

pub struct GitHubApi {
    base_url: String,
    client: Client,
}

impl GitHubApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static("2022-11-28"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get<T: DeserializeOwned>(
        &self,
        credentials: &Credentials,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path);
        log::debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .basic_auth(&credentials.username, Some(&credentials.token))
            .query(query)
            .send()?;

        read_json(response)
    }
}

fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    log::debug!("{} {}", status.as_u16(), response.url());

    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::InvalidCredentials);
    }

    if !status.is_success() {
        let message = response
            .json::<ApiMessage>()
            .map(|body| body.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unexpected response").to_string());
        return Err(AppError::Transport(format!("{} (HTTP {})", message, status.as_u16())));
    }

    Ok(response.json()?)
}

/// Search query for pull requests of `repo` that mention `commit`
pub fn search_query(repo: &str, commit: &str) -> String {
    format!("repo:{} type:pr {}", repo, commit)
}

impl Forge for GitHubApi {
    type Session = Session;

    fn authenticate(&self, credentials: &Credentials) -> Result<Session> {
        let user: User = self.get(credentials, "user", &[])?;

        match user.login {
            Some(login) if !login.is_empty() => {
                log::debug!("Authenticated as {}", login);
                Ok(Session {
                    credentials: credentials.clone(),
                    login,
                })
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn find_pull_request_for_commit(
        &self,
        session: &Session,
        repo: &str,
        commit: &str,
    ) -> Result<Option<PullRequestStatus>> {
        let query = search_query(repo, commit);
        let results: SearchResults = self.get(&session.credentials, "search/issues", &[("q", query.as_str())])?;
        log::debug!("{} results for {:?} as {}", results.total_count, query, session.login);

        let Some(issue) = results.items.first() else {
            return Ok(None);
        };

        // Search hands back the issue view, the merge flag only lives on the pull request
        let pull: PullRequest = self.get(
            &session.credentials,
            &format!("repos/{}/pulls/{}", repo, issue.number),
            &[],
        )?;

        Ok(Some(pull.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{ApiState, PullRequestState};
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Serve one canned response per connection, returning the request lines seen
    fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = std::thread::spawn(move || {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    if header == "\r\n" || header.is_empty() {
                        break;
                    }
                }
                requests.push(request_line.trim_end().to_string());

                write!(
                    stream,
                    "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                )
                .unwrap();
                stream.flush().unwrap();
            }
            requests
        });

        (base_url, handle)
    }

    fn credentials() -> Credentials {
        Credentials::new("octocat", "ghp_valid")
    }

    #[test]
    fn test_authenticate_unauthorized() {
        let (base_url, server) = serve(vec![(401, r#"{"message": "Bad credentials"}"#)]);
        let api = GitHubApi::new(&base_url).unwrap();

        let result = api.authenticate(&credentials());

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        assert_eq!(server.join().unwrap(), vec!["GET /user HTTP/1.1"]);
    }

    #[test]
    fn test_authenticate_without_login() {
        let (base_url, server) = serve(vec![(200, r#"{"id": 1}"#)]);
        let api = GitHubApi::new(&base_url).unwrap();

        let result = api.authenticate(&credentials());

        assert!(matches!(result, Err(AppError::InvalidCredentials)));
        server.join().unwrap();
    }

    #[test]
    fn test_server_error_is_transport() {
        let (base_url, server) = serve(vec![(500, r#"{"message": "Server Error"}"#)]);
        let api = GitHubApi::new(&base_url).unwrap();

        let result = api.authenticate(&credentials());

        match result {
            Err(AppError::Transport(message)) => assert_eq!(message, "Server Error (HTTP 500)"),
            other => panic!("expected a transport error, got {:?}", other.err()),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_search_resolves_pull_request() {
        let (base_url, server) = serve(vec![
            (200, r#"{"login": "octocat"}"#),
            (200, r#"{"total_count": 1, "items": [{"number": 5}]}"#),
            (
                200,
                r#"{"number": 5, "state": "closed", "merged": true, "title": "Add X", "html_url": "https://github.com/octo/hello/pull/5"}"#,
            ),
        ]);
        let api = GitHubApi::new(&base_url).unwrap();

        let session = api.authenticate(&credentials()).unwrap();
        let status = api
            .find_pull_request_for_commit(&session, "octo/hello", "1a2b3c4")
            .unwrap()
            .unwrap();

        assert_eq!(status.state, PullRequestState::Merged);
        assert_eq!(status.title, "Add X");
        assert_eq!(status.url, "https://github.com/octo/hello/pull/5");

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0], "GET /user HTTP/1.1");
        assert!(requests[1].starts_with("GET /search/issues?q=repo%3Aocto%2Fhello+type%3Apr+1a2b3c4 "));
        assert_eq!(requests[2], "GET /repos/octo/hello/pulls/5 HTTP/1.1");
    }

    #[test]
    fn test_search_without_results() {
        let (base_url, server) = serve(vec![
            (200, r#"{"login": "octocat"}"#),
            (200, r#"{"total_count": 0, "incomplete_results": false, "items": []}"#),
        ]);
        let api = GitHubApi::new(&base_url).unwrap();

        let session = api.authenticate(&credentials()).unwrap();
        let status = api
            .find_pull_request_for_commit(&session, "octo/hello", "1a2b3c4")
            .unwrap();

        assert_eq!(status, None);
        assert_eq!(server.join().unwrap().len(), 2);
    }

    #[test]
    fn test_search_query() {
        assert_eq!(search_query("octo/hello", "1a2b3c4"), "repo:octo/hello type:pr 1a2b3c4");
    }

    #[test]
    fn test_url_joins_base_and_path() {
        let api = GitHubApi::new("https://ghe.example.com/api/v3/").unwrap();
        assert_eq!(api.url("/search/issues"), "https://ghe.example.com/api/v3/search/issues");
        assert_eq!(api.url("user"), "https://ghe.example.com/api/v3/user");
    }

    #[test]
    fn test_decode_search_results() {
        let body = r#"{
            "total_count": 2,
            "incomplete_results": false,
            "items": [
                {"number": 42, "title": "Add X", "state": "closed", "pull_request": {"url": "x"}},
                {"number": 7, "title": "Older", "state": "open", "pull_request": {"url": "y"}}
            ]
        }"#;
        let results: SearchResults = serde_json::from_str(body).unwrap();

        assert_eq!(results.total_count, 2);
        assert_eq!(results.items[0].number, 42);
    }

    #[test]
    fn test_decode_empty_search_results() {
        let results: SearchResults =
            serde_json::from_str(r#"{"total_count": 0, "incomplete_results": false, "items": []}"#).unwrap();
        assert!(results.items.is_empty());
    }

    #[test]
    fn test_decode_merged_pull_request() {
        let body = r#"{
            "number": 42,
            "state": "closed",
            "title": "Add X",
            "html_url": "https://github.com/octo/hello/pull/42",
            "merged": true
        }"#;
        let pull: PullRequest = serde_json::from_str(body).unwrap();
        assert_eq!(pull.state, ApiState::Closed);

        let status: PullRequestStatus = pull.into();
        assert_eq!(status.state, PullRequestState::Merged);
        assert_eq!(status.title, "Add X");
        assert_eq!(status.url, "https://github.com/octo/hello/pull/42");
    }

    #[test]
    fn test_classification_priority() {
        assert_eq!(PullRequestState::classify(true, ApiState::Closed), PullRequestState::Merged);
        assert_eq!(PullRequestState::classify(true, ApiState::Open), PullRequestState::Merged);
        assert_eq!(PullRequestState::classify(false, ApiState::Closed), PullRequestState::Closed);
        assert_eq!(PullRequestState::classify(false, ApiState::Open), PullRequestState::Open);
    }

    #[test]
    fn test_decode_user_without_login() {
        let user: User = serde_json::from_str(r#"{"message": "Bad credentials"}"#).unwrap();
        assert!(user.login.is_none());
    }
}

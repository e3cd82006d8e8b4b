//! Thin REST client for Jira Cloud.

use reqwest::{header, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::types::{JiraIssue, SearchResponse};
use crate::config::JiraConfig;
use crate::source::SourceError;

/// Authenticated Jira REST client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    client: Client,
    base_url: Url,
    email: String,
    api_token: String,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Result<Self, SourceError> {
        if !config.is_configured() {
            return Err(SourceError::NotConfigured(
                "jira.base_url, jira.email and jira.api_token are required".to_string(),
            ));
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        headers.insert("X-Atlassian-Token", header::HeaderValue::from_static("no-check"));

        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                SourceError::NotConfigured(format!("invalid jira.base_url '{}'", config.base_url))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url,
            email: config.email.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// One page of a JQL search.
    pub async fn search_page(
        &self,
        jql: &str,
        max_results: u32,
        next_page_token: Option<&str>,
    ) -> Result<SearchResponse, SourceError> {
        let max_results = max_results.to_string();
        let mut query = vec![
            ("jql", jql),
            ("fields", "*all"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = next_page_token {
            query.push(("nextPageToken", token));
        }

        let response = self
            .client
            .get(self.endpoint(&["rest", "api", "3", "search", "jql"])?)
            .basic_auth(&self.email, Some(&self.api_token))
            .query(&query)
            .send()
            .await?;

        Self::decode(response).await
    }

    /// Fetch one issue; `None` when Jira answers 404.
    pub async fn get_issue(&self, key: &str) -> Result<Option<JiraIssue>, SourceError> {
        let response = self
            .client
            .get(self.endpoint(&["rest", "api", "3", "issue", key])?)
            .basic_auth(&self.email, Some(&self.api_token))
            .query(&[("fields", "*all")])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::decode(response).await.map(Some)
    }

    /// Append path segments to the base URL. Each segment is
    /// percent-encoded, so `/`, `?` and `..` inside one stay literal.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceError::NotConfigured("jira.base_url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SourceError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{any, header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> JiraConfig {
        JiraConfig {
            base_url: server.uri(),
            email: "ops@acme.test".to_string(),
            api_token: "token".to_string(),
            ..JiraConfig::default()
        }
    }

    #[test]
    fn test_requires_credentials() {
        let err = JiraClient::new(&JiraConfig::default()).unwrap_err();
        assert!(matches!(err, SourceError::NotConfigured(_)));

        let config = JiraConfig {
            base_url: "not a url".to_string(),
            email: "ops@acme.test".to_string(),
            api_token: "token".to_string(),
            ..JiraConfig::default()
        };
        assert!(matches!(
            JiraClient::new(&config).unwrap_err(),
            SourceError::NotConfigured(_)
        ));
    }

    #[tokio::test]
    async fn test_issue_key_stays_inside_issue_path() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_regex(r"^/rest/api/3/issue/[^/]+$"))
            .respond_with(ResponseTemplate::new(404))
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accountId": "svc" })))
            .with_priority(10)
            .expect(0)
            .mount(&server)
            .await;

        let client = JiraClient::new(&config_for(&server)).unwrap();
        for key in ["../../../api/2/myself", "SUP-1/../../myself", "SUP-1?jql=project"] {
            assert!(client.get_issue(key).await.unwrap().is_none(), "{key}");
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
        for request in &requests {
            assert!(request.url.path().starts_with("/rest/api/3/issue/"));
            assert!(request.url.query_pairs().all(|(name, _)| name == "fields"));
        }
        assert_eq!(
            requests[0].url.path(),
            "/rest/api/3/issue/..%2F..%2F..%2Fapi%2F2%2Fmyself"
        );
    }

    #[tokio::test]
    async fn test_search_page_sends_query_and_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search/jql"))
            .and(query_param("jql", "project = SUP"))
            .and(query_param("maxResults", "25"))
            .and(query_param("nextPageToken", "abc"))
            .and(header("X-Atlassian-Token", "no-check"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "issues": [],
                "nextPageToken": "def"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = JiraClient::new(&config_for(&server)).unwrap();
        let page = client.search_page("project = SUP", 25, Some("abc")).await.unwrap();

        assert!(page.issues.is_empty());
        assert_eq!(page.next_token(), Some("def"));
    }

    #[tokio::test]
    async fn test_error_status_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
            .mount(&server)
            .await;

        let client = JiraClient::new(&config_for(&server)).unwrap();
        let err = client.search_page("project = SUP", 10, None).await.unwrap_err();

        match err {
            SourceError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = JiraClient::new(&config_for(&server)).unwrap();
        let err = client.search_page("x", 10, None).await.unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_issue_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/issue/SUP-404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = JiraClient::new(&config_for(&server)).unwrap();
        assert!(client.get_issue("SUP-404").await.unwrap().is_none());
    }
}

//! HTTP client for the Maven Central Solr search API.
//!
//! Documentation: <https://central.sonatype.org/search/rest-api-guide/>

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::config::MavenConfig;
use crate::error::{ClientBuildError, SearchError};
use crate::maven::query::SearchQuery;

/// Top-level search reply, `{ "response": { "docs": [...] } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// The Solr result block.
    pub response: SearchResults,
}

/// Result block of a search reply.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    /// Matching documents, already sorted by the service.
    pub docs: Vec<SearchDoc>,
}

/// One GAV record.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchDoc {
    /// Version string.
    pub v: String,
    /// Publish time in milliseconds since the epoch. Kept as a raw JSON
    /// number since the service may send it as a float.
    #[serde(default)]
    pub timestamp: Option<Number>,
}

/// Something that can answer a [`SearchQuery`].
///
/// [`MavenCentralClient`] is the production implementation; tests plug in
/// stubs.
#[allow(async_fn_in_trait)]
pub trait SearchService {
    /// Runs one search.
    ///
    /// # Errors
    ///
    /// [`SearchError::Upstream`] for HTTP status and transport failures,
    /// [`SearchError::Unexpected`] for anything else.
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError>;
}

/// Search client bound to one endpoint.
///
/// Holds a single `reqwest::Client`, so connections are pooled across
/// requests for the lifetime of the server.
#[derive(Debug, Clone)]
pub struct MavenCentralClient {
    client: Client,
    base_url: String,
}

impl MavenCentralClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: &MavenConfig) -> Result<Self, ClientBuildError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    /// Creates a client with default settings against `base_url` (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        let config = MavenConfig {
            base_url: base_url.into(),
            ..MavenConfig::default()
        };
        Self::new(&config)
    }

    /// Returns the endpoint this client queries.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SearchService for MavenCentralClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        tracing::debug!(url = %self.base_url, q = %query.q, "Querying Maven Central");

        let response = self
            .client
            .get(&self.base_url)
            .query(&query.params())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Search request failed");
                SearchError::upstream(e.to_string())
            })?;

        let status = response.status();
        let status_error = response.error_for_status_ref().err().map(|e| e.to_string());
        if let Some(generic) = status_error {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::debug!(error = %e, "Failed to read error response body");
                String::new()
            });
            let message = server_message(&body).unwrap_or(generic);
            tracing::warn!(%status, message = %message, "Search service returned an error");
            return Err(SearchError::upstream(message));
        }

        let body = response.bytes().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read search response body");
            SearchError::upstream(e.to_string())
        })?;

        serde_json::from_slice(&body)
            .map_err(|e| SearchError::Unexpected(format!("invalid search response: {e}")))
    }
}

/// Extracts the human-readable message from an error body, if there is one.
///
/// Solr reports `{"error": {"msg": ...}}`; proxies in front of it tend to use
/// `{"error": {"message": ...}}` or a bare `{"message": ...}`.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["/error/msg", "/error/message", "/message"]
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::maven::coordinate::Coordinate;

    fn spring_query() -> SearchQuery {
        let coord = Coordinate::parse("org.springframework:spring-core").unwrap();
        SearchQuery::for_coordinate(&coord)
    }

    fn client_for(server: &MockServer) -> MavenCentralClient {
        MavenCentralClient::with_base_url(format!("{}/solrsearch/select", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn sends_all_query_parameters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/solrsearch/select"))
            .and(query_param("q", r#"g:"org.springframework" AND a:"spring-core""#))
            .and(query_param("core", "gav"))
            .and(query_param("rows", "1"))
            .and(query_param("wt", "json"))
            .and(query_param("sort", "timestamp desc"))
            .and(header("user-agent", MavenConfig::default().user_agent.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": {
                    "numFound": 1,
                    "docs": [{"g": "org.springframework", "a": "spring-core", "v": "6.1.2", "timestamp": 1_702_000_000_000_i64}]
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).search(&spring_query()).await.unwrap();
        assert_eq!(result.response.docs.len(), 1);
        assert_eq!(result.response.docs[0].v, "6.1.2");
        assert_eq!(
            result.response.docs[0].timestamp.as_ref().and_then(Number::as_i64),
            Some(1_702_000_000_000)
        );
    }

    #[tokio::test]
    async fn float_timestamp_decodes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"response":{"docs":[{"v":"6.1.2","timestamp":1.702e12}]}}"#,
            ))
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).search(&spring_query()).await.unwrap();
        let doc = &result.response.docs[0];
        assert_eq!(doc.v, "6.1.2");
        assert_eq!(doc.timestamp.as_ref().and_then(Number::as_f64), Some(1.702e12));
    }

    #[tokio::test]
    async fn empty_docs_decode() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": {"numFound": 0, "docs": []}})),
            )
            .mount(&mock_server)
            .await;

        let result = client_for(&mock_server).search(&spring_query()).await.unwrap();
        assert!(result.response.docs.is_empty());
    }

    #[tokio::test]
    async fn http_error_uses_server_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"msg": "bad query", "code": 400}})),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).search(&spring_query()).await.unwrap_err();
        match err {
            SearchError::Upstream { message } => assert_eq!(message, "bad query"),
            SearchError::Unexpected(other) => panic!("expected upstream error, got {other}"),
        }
    }

    #[tokio::test]
    async fn http_error_without_message_falls_back() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).search(&spring_query()).await.unwrap_err();
        let SearchError::Upstream { message } = err else {
            panic!("expected upstream error");
        };
        assert!(message.contains("503"), "unexpected message: {message}");
    }

    #[tokio::test]
    async fn malformed_body_is_unexpected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server).search(&spring_query()).await.unwrap_err();
        assert!(matches!(err, SearchError::Unexpected(_)));
    }

    #[tokio::test]
    async fn connection_failure_is_upstream() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = MavenCentralClient::with_base_url(format!("http://{addr}/select")).unwrap();

        let err = client.search(&spring_query()).await.unwrap_err();
        assert!(matches!(err, SearchError::Upstream { .. }));
    }

    #[test]
    fn server_message_variants() {
        assert_eq!(
            server_message(r#"{"error":{"msg":"bad query"}}"#).as_deref(),
            Some("bad query")
        );
        assert_eq!(
            server_message(r#"{"error":{"message":"nope"}}"#).as_deref(),
            Some("nope")
        );
        assert_eq!(server_message(r#"{"message":"down"}"#).as_deref(), Some("down"));
        assert_eq!(server_message(r#"{"message":""}"#), None);
        assert_eq!(server_message("plain text"), None);
    }

    #[test]
    fn with_base_url_keeps_url() {
        let client = MavenCentralClient::with_base_url("http://localhost:1/select").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1/select");
    }
}

//! SaaSOptics API client implementing the core `RecordSource` port
//!
//! Endpoints live under `https://{account}.{subdomain}.saasoptics.com/api/v1.0/`
//! and authenticate with an `Authorization: Token {token}` header. List
//! responses use a paging envelope (`count` / `next` / `previous` /
//! `results`); pagination follows the `next` URL until it is null.
//! Incremental extraction filters with `modified__gte=<bookmark>`, an
//! inclusive lower bound.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use saasoptics_core::{ExtractionPlan, RecordPages, RecordSource};
use saasoptics_domain::{Result, TapConfig, TapError};

use crate::http::HttpClient;

/// Records requested per page.
const PAGE_SIZE: u32 = 100;

/// Query parameter for the inclusive modification-time filter.
const MODIFIED_SINCE_PARAM: &str = "modified__gte";

/// Configuration for the SaaSOptics client.
#[derive(Debug, Clone)]
pub struct SaasOpticsClientConfig {
    /// API root, e.g. `https://acme.na1.saasoptics.com/api/v1.0`.
    pub base_url: String,
    /// API token sent on every request.
    pub token: String,
    /// User agent identifying this tap to the remote.
    pub user_agent: String,
    /// Timeout for individual page requests.
    pub timeout: Duration,
    /// Total attempts per page request (initial try + retries).
    pub max_attempts: usize,
}

impl SaasOpticsClientConfig {
    /// Derive the client configuration from the tap config.
    pub fn from_tap_config(config: &TapConfig) -> Self {
        Self {
            base_url: format!(
                "https://{}.{}.saasoptics.com/api/v1.0",
                config.account_name, config.server_subdomain
            ),
            token: config.token.clone(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

/// SaaSOptics API client.
///
/// Constructed once per run; the underlying connection pool is released when
/// the last clone drops, on every exit path.
pub struct SaasOpticsClient {
    http: HttpClient,
    config: SaasOpticsClientConfig,
}

impl SaasOpticsClient {
    /// Build a client from its configuration.
    ///
    /// # Errors
    /// Returns an error when the underlying HTTP client cannot be built.
    pub fn new(config: SaasOpticsClientConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { http, config })
    }

    fn first_page_url(&self, stream: &str, plan: &ExtractionPlan) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{stream}/", self.config.base_url))
            .map_err(|err| TapError::Config(format!("invalid API base URL: {err}")))?;

        url.query_pairs_mut().append_pair("page_size", &PAGE_SIZE.to_string());
        if let Some(bookmark) = plan.modified_since.as_deref() {
            url.query_pairs_mut().append_pair(MODIFIED_SINCE_PARAM, bookmark);
        }
        Ok(url)
    }
}

#[async_trait]
impl RecordSource for SaasOpticsClient {
    #[instrument(skip(self, plan), fields(modified_since = plan.modified_since.as_deref()))]
    async fn fetch(&self, stream: &str, plan: &ExtractionPlan) -> Result<Box<dyn RecordPages>> {
        let first = self.first_page_url(stream, plan)?;
        Ok(Box::new(SaasOpticsPages {
            http: self.http.clone(),
            token: self.config.token.clone(),
            stream: stream.to_string(),
            next: Some(first),
        }))
    }
}

/// Paging envelope returned by SaaSOptics list endpoints.
#[derive(Debug, Deserialize)]
struct PageEnvelope {
    #[serde(default)]
    count: Option<u64>,
    next: Option<String>,
    results: Vec<Value>,
}

struct SaasOpticsPages {
    http: HttpClient,
    token: String,
    stream: String,
    next: Option<Url>,
}

#[async_trait]
impl RecordPages for SaasOpticsPages {
    async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        debug!(stream = %self.stream, %url, "fetching page");
        let request = self
            .http
            .request(Method::GET, url.clone())
            .header("Authorization", format!("Token {}", self.token));
        let response = self.http.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(&self.stream, status));
        }

        let envelope: PageEnvelope = response.json().await.map_err(|err| {
            TapError::Data(format!("malformed page for stream '{}': {err}", self.stream))
        })?;

        self.next = envelope
            .next
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|err| {
                TapError::Data(format!("invalid next URL for stream '{}': {err}", self.stream))
            })?;

        debug!(
            stream = %self.stream,
            records = envelope.results.len(),
            total = envelope.count,
            has_next = self.next.is_some(),
            "page received"
        );
        Ok(Some(envelope.results))
    }
}

fn status_error(stream: &str, status: StatusCode) -> TapError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            TapError::Auth(format!("stream '{stream}': API rejected credentials ({status})"))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            TapError::RateLimit(format!("stream '{stream}': rate limited after retries"))
        }
        StatusCode::NOT_FOUND => {
            TapError::NotFound(format!("stream '{stream}': endpoint not found"))
        }
        other => TapError::Network(format!("stream '{stream}': API returned {other}")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(server: &MockServer) -> SaasOpticsClientConfig {
        SaasOpticsClientConfig {
            base_url: format!("{}/api/v1.0", server.uri()),
            token: "secret-token".into(),
            user_agent: "tap-saasoptics <ops@example.com>".into(),
            timeout: Duration::from_secs(5),
            max_attempts: 2,
        }
    }

    async fn drain_all(client: &SaasOpticsClient, stream: &str, plan: &ExtractionPlan) -> Result<Vec<Value>> {
        let mut pages = client.fetch(stream, plan).await?;
        let mut records = Vec::new();
        while let Some(page) = pages.next_page().await? {
            records.extend(page);
        }
        Ok(records)
    }

    #[tokio::test]
    async fn follows_next_links_until_exhaustion() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1.0/invoices/"))
            .and(query_param("page_size", "100"))
            .and(header("Authorization", "Token secret-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "next": format!("{}/api/v1.0/invoices/page2/", server.uri()),
                "previous": null,
                "results": [{"id": 1}, {"id": 2}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/v1.0/invoices/page2/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 3,
                "next": null,
                "previous": null,
                "results": [{"id": 3}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SaasOpticsClient::new(test_config(&server)).unwrap();
        let records =
            drain_all(&client, "invoices", &ExtractionPlan::default()).await.unwrap();

        let ids: Vec<i64> = records.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn incremental_plan_sends_modified_filter() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1.0/invoices/"))
            .and(query_param("modified__gte", "2020-01-10T00:00:00Z"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 0, "next": null, "previous": null, "results": [],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SaasOpticsClient::new(test_config(&server)).unwrap();
        let plan =
            ExtractionPlan { modified_since: Some("2020-01-10T00:00:00Z".into()) };
        let records = drain_all(&client, "invoices", &plan).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn rejected_credentials_surface_as_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SaasOpticsClient::new(test_config(&server)).unwrap();
        let err = drain_all(&client, "invoices", &ExtractionPlan::default()).await.unwrap_err();
        assert!(matches!(err, TapError::Auth(_)));
    }

    #[tokio::test]
    async fn exhausted_server_errors_surface_as_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2) // max_attempts in test_config
            .mount(&server)
            .await;

        let client = SaasOpticsClient::new(test_config(&server)).unwrap();
        let err = drain_all(&client, "invoices", &ExtractionPlan::default()).await.unwrap_err();
        assert!(matches!(err, TapError::Network(_)));
    }

    #[tokio::test]
    async fn malformed_envelope_is_a_data_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = SaasOpticsClient::new(test_config(&server)).unwrap();
        let err = drain_all(&client, "invoices", &ExtractionPlan::default()).await.unwrap_err();
        assert!(matches!(err, TapError::Data(_)));
    }

    #[test]
    fn config_derives_base_url_from_account_and_subdomain() {
        let tap_config = TapConfig {
            token: "t".into(),
            account_name: "acme".into(),
            server_subdomain: "na1".into(),
            start_date: "2020-01-01T00:00:00Z".into(),
            user_agent: "ua".into(),
            full_sync: None,
            schema_dir: None,
        };
        let config = SaasOpticsClientConfig::from_tap_config(&tap_config);
        assert_eq!(config.base_url, "https://acme.na1.saasoptics.com/api/v1.0");
    }
}

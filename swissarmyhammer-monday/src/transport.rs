//! Transport for GraphQL calls.
//!
//! [`Transport`] is the seam between the column mapping core and the network.
//! [`HttpTransport`] is the production implementation on `reqwest`: it adds the
//! authentication headers, retries transient failures with exponential backoff,
//! and maps HTTP failures to [`TransportError`].

use crate::config::MondayConfig;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, instrument, warn};
use url::Url;

// HTTP status code constants
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

// Exponential backoff constants
const BACKOFF_MULTIPLIER: u32 = 2;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Executes GraphQL documents and returns the raw JSON response body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a query document.
    async fn execute_query(&self, query: &str) -> Result<Value, TransportError>;

    /// Run a mutation document with its variables.
    async fn execute_mutation(
        &self,
        mutation: &str,
        variables: Value,
    ) -> Result<Value, TransportError>;
}

/// HTTP transport with retry logic and error handling.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
    token: String,
    api_version: Option<String>,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpTransport {
    /// Creates a transport from configuration.
    ///
    /// # Errors
    ///
    /// * `TransportError::InvalidEndpoint` - If the endpoint is not an http(s) URL
    /// * `TransportError::Connection` - If the underlying HTTP client cannot be built
    pub fn new(config: &MondayConfig) -> Result<Self, TransportError> {
        let endpoint = parse_endpoint(&config.endpoint)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("swissarmyhammer-monday/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Connection {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint,
            token: config.token.clone(),
            api_version: config.api_version.clone(),
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn build_request(&self, body: &Value) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", &self.token)
            .json(body);
        if let Some(version) = &self.api_version {
            request = request.header("API-Version", version);
        }
        request
    }

    /// Executes a single attempt.
    ///
    /// Returns Ok(Some(body)) for success, Ok(None) when the attempt should be
    /// retried, or Err for failures that retrying will not fix.
    async fn execute_attempt(
        &self,
        body: &Value,
        attempt: u32,
    ) -> Result<Option<Value>, TransportError> {
        debug!("Attempt {} of {}", attempt + 1, self.max_retries + 1);
        let last_attempt = attempt == self.max_retries;

        let response = match self.build_request(body).send().await {
            Ok(response) => response,
            Err(e) if last_attempt => return Err(map_reqwest_error(e)),
            Err(e) => {
                warn!("Request failed, will retry: {}", e);
                return Ok(None);
            }
        };

        let status = response.status();
        debug!("Received HTTP response: {}", status);

        if status.is_success() {
            let text = response.text().await.map_err(map_reqwest_error)?;
            return serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| TransportError::InvalidBody {
                    message: e.to_string(),
                });
        }

        if is_retryable(status) && !last_attempt {
            warn!("Transient HTTP status {}, will retry", status);
            return Ok(None);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            status_code: status.as_u16(),
            body,
        })
    }

    /// Posts a GraphQL body, retrying transient failures with exponential backoff.
    #[instrument(skip(self, body), fields(attempt, max_retries = self.max_retries))]
    async fn post(&self, body: Value) -> Result<Value, TransportError> {
        for attempt in 0..=self.max_retries {
            tracing::Span::current().record("attempt", attempt);

            if let Some(response) = self.execute_attempt(&body, attempt).await? {
                return Ok(response);
            }
            if attempt < self.max_retries {
                sleep(backoff_delay(self.base_delay, attempt)).await;
            }
        }

        // The last attempt always returns a value or an error
        Err(TransportError::Connection {
            message: "max retries exceeded".to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute_query(&self, query: &str) -> Result<Value, TransportError> {
        self.post(json!({ "query": query })).await
    }

    async fn execute_mutation(
        &self,
        mutation: &str,
        variables: Value,
    ) -> Result<Value, TransportError> {
        self.post(json!({ "query": mutation, "variables": variables }))
            .await
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, TransportError> {
    let invalid = |message: String| TransportError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        message,
    };
    let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(invalid(format!("unsupported scheme: {scheme}"))),
    }
}

/// `base * 2^attempt`, saturating at `MAX_RETRY_DELAY`.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    if base.is_zero() {
        return base;
    }
    BACKOFF_MULTIPLIER
        .checked_pow(attempt)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}

fn is_retryable(status: StatusCode) -> bool {
    status.is_server_error() || status.as_u16() == HTTP_TOO_MANY_REQUESTS
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    let message = if error.is_timeout() {
        format!("request timeout: {error}")
    } else {
        error.to_string()
    };
    TransportError::Connection { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: String) -> MondayConfig {
        MondayConfig::builder()
            .endpoint(endpoint)
            .token("test-token")
            .api_version("2024-01")
            .max_retries(2)
            .retry_delay_ms(1)
            .build()
    }

    #[tokio::test]
    async fn test_query_sends_auth_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2"))
            .and(header("Authorization", "test-token"))
            .and(header("API-Version", "2024-01"))
            .and(body_partial_json(json!({"query": "query { me { id } }"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"me": {"id": "1"}}})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&test_config(format!("{}/v2", mock_server.uri()))).unwrap();
        let response = transport.execute_query("query { me { id } }").await.unwrap();
        assert_eq!(response["data"]["me"]["id"], "1");
    }

    #[tokio::test]
    async fn test_mutation_sends_variables() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({"variables": {"itemId": "7"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&test_config(mock_server.uri())).unwrap();
        transport
            .execute_mutation("mutation ($itemId: ID!) { x }", json!({"itemId": "7"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Not Authenticated"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&test_config(mock_server.uri())).unwrap();
        let err = transport.execute_query("query { me { id } }").await.unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status_code: 401,
                body: "Not Authenticated".into()
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_retries_then_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(3)
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&test_config(mock_server.uri())).unwrap();
        let err = transport.execute_query("query { me { id } }").await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status_code: 503, .. }));
    }

    #[tokio::test]
    async fn test_retry_recovers_after_rate_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}})))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&test_config(mock_server.uri())).unwrap();
        let response = transport.execute_query("query { ok }").await.unwrap();
        assert_eq!(response["data"]["ok"], true);
    }

    #[tokio::test]
    async fn test_many_retries_do_not_overflow_backoff() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(41)
            .mount(&mock_server)
            .await;

        let config = MondayConfig::builder()
            .endpoint(mock_server.uri())
            .token("test-token")
            .max_retries(40)
            .retry_delay_ms(0)
            .build();
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport.execute_query("query { ok }").await.unwrap_err();
        assert!(matches!(err, TransportError::Status { status_code: 503, .. }));
    }

    #[test]
    fn test_backoff_delay_saturates() {
        let base = Duration::from_secs(1);
        assert_eq!(backoff_delay(base, 0), Duration::from_secs(1));
        assert_eq!(backoff_delay(base, 3), Duration::from_secs(8));
        assert_eq!(backoff_delay(base, 10), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(base, 40), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(Duration::MAX, 1), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(Duration::ZERO, 40), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(&test_config(mock_server.uri())).unwrap();
        let err = transport.execute_query("query { ok }").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidBody { .. }));
    }

    #[test]
    fn test_endpoint_must_be_http() {
        let err = HttpTransport::new(&test_config("ftp://example.com".into())).unwrap_err();
        assert!(matches!(err, TransportError::InvalidEndpoint { .. }));

        let err = HttpTransport::new(&test_config("not a url".into())).unwrap_err();
        assert!(matches!(err, TransportError::InvalidEndpoint { .. }));
    }
}

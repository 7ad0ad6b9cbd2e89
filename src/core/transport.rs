//! HTTP Transport
//!
//! HTTP client seam for the outbound protocol exchanges. The token endpoint,
//! revocation, and userinfo calls all go through [`HttpTransport`] so tests
//! can observe requests and script responses without a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{AuthError, ProtocolError, TransportError};

/// HTTP request definition.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Form-encoded POST, the shape of every token-endpoint exchange.
    pub fn form_post(url: impl Into<String>, body: String, timeout: Duration) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        );
        headers.insert("accept".to_string(), "application/json".to_string());

        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers,
            body: Some(body),
            timeout: Some(timeout),
        }
    }

    /// GET with a bearer Authorization header (userinfo).
    pub fn bearer_get(url: impl Into<String>, access_token: &str, timeout: Duration) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            "authorization".to_string(),
            format!("Bearer {access_token}"),
        );
        headers.insert("accept".to_string(), "application/json".to_string());

        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers,
            body: None,
            timeout: Some(timeout),
        }
    }
}

/// HTTP method. Only the verbs the protocol exchanges use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// HTTP response definition.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: String,
}

impl HttpResponse {
    /// RFC 7009 and RFC 6749 both treat any 2xx as success.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport interface (for dependency injection).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request, honoring its timeout.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError>;
}

/// Default reqwest-based HTTP transport.
pub struct ReqwestHttpTransport {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl ReqwestHttpTransport {
    /// Create new transport with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(crate::types::DEFAULT_TIMEOUT)
    }

    /// Create transport with a custom default timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        // OAuth2 endpoints must not be followed through redirects.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            default_timeout: timeout,
        }
    }
}

impl Default for ReqwestHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                AuthError::Transport(TransportError::Timeout { timeout })
            } else {
                AuthError::Transport(TransportError::ConnectionFailed {
                    message: e.to_string(),
                })
            }
        })?;

        let status = response.status().as_u16();

        if (300..400).contains(&status) {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            return Err(AuthError::Protocol(ProtocolError::UnexpectedRedirect {
                location,
            }));
        }

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string().to_lowercase(), v.to_string());
            }
        }

        let body = response.text().await.map_err(|e| {
            AuthError::Protocol(ProtocolError::InvalidResponse {
                message: e.to_string(),
            })
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Mock HTTP transport for testing.
///
/// Queued responses are returned in FIFO order; an empty queue with no
/// default response behaves like a connection failure, which is how the
/// refresh tests simulate transport exceptions.
#[derive(Default)]
pub struct MockHttpTransport {
    responses: std::sync::Mutex<std::collections::VecDeque<HttpResponse>>,
    request_history: std::sync::Mutex<Vec<HttpRequest>>,
    default_response: std::sync::Mutex<Option<HttpResponse>>,
}

impl MockHttpTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: HttpResponse) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Queue a JSON response with the given status.
    pub fn queue_json_response<T: serde::Serialize>(&self, status: u16, body: &T) -> &Self {
        let response = HttpResponse {
            status,
            headers: [("content-type".to_string(), "application/json".to_string())]
                .into_iter()
                .collect(),
            body: serde_json::to_string(body).unwrap(),
        };
        self.queue_response(response)
    }

    /// Queue a plain-status response with a raw body.
    pub fn queue_status(&self, status: u16, body: impl Into<String>) -> &Self {
        self.queue_response(HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.into(),
        })
    }

    /// Set default response when the queue is empty.
    pub fn set_default_response(&self, response: HttpResponse) -> &Self {
        *self.default_response.lock().unwrap() = Some(response);
        self
    }

    /// Get request history.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.request_history.lock().unwrap().clone()
    }

    /// Get last request.
    pub fn get_last_request(&self) -> Option<HttpRequest> {
        self.request_history.lock().unwrap().last().cloned()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.request_history.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, AuthError> {
        self.request_history.lock().unwrap().push(request);

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.default_response.lock().unwrap().clone());

        response.ok_or_else(|| {
            AuthError::Transport(TransportError::ConnectionFailed {
                message: "no mock response available".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_fifo() {
        let transport = MockHttpTransport::new();
        transport.queue_status(200, "first");
        transport.queue_status(403, "second");

        let request = HttpRequest::form_post(
            "https://auth.example.com/token",
            "grant_type=refresh_token".to_string(),
            Duration::from_secs(5),
        );

        let first = transport.send(request.clone()).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(first.body, "first");
        assert!(first.is_success());

        let second = transport.send(request).await.unwrap();
        assert_eq!(second.status, 403);
        assert!(!second.is_success());

        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_exhausted_queue_is_transport_error() {
        let transport = MockHttpTransport::new();
        let request = HttpRequest::bearer_get(
            "https://auth.example.com/userinfo",
            "token",
            Duration::from_secs(5),
        );

        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }

    #[test]
    fn test_form_post_headers() {
        let request = HttpRequest::form_post(
            "https://auth.example.com/token",
            "a=b".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.headers.get("content-type").unwrap(),
            "application/x-www-form-urlencoded"
        );
    }

    #[test]
    fn test_bearer_get_header() {
        let request = HttpRequest::bearer_get(
            "https://auth.example.com/userinfo",
            "abc123",
            Duration::from_secs(5),
        );
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(
            request.headers.get("authorization").unwrap(),
            "Bearer abc123"
        );
    }
}

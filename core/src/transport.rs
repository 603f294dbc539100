//! Blocking execution of `HttpRequest` values.
//!
//! # Design
//! `Transport` is the single request-execution primitive every client
//! operation goes through. It returns the response as data, including non-2xx
//! statuses, so that interpreting the status stays with `CouchClient`. Only
//! failures below HTTP semantics (connect, DNS, timeout, bad URL, body not
//! UTF-8) become errors here.
//!
//! `UreqTransport` is the default implementation. Any other HTTP stack can be
//! plugged in by implementing the trait.

use std::time::Duration;

use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP exchange synchronously.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Settings for the default transport.
#[derive(Debug, Clone, Default)]
pub struct TransportConfig {
    /// Upper bound for a whole exchange. `None` keeps ureq's defaults.
    pub timeout: Option<Duration>,
    /// Largest response body accepted, in bytes. `None` reads bodies whole,
    /// whatever their size.
    pub body_limit: Option<u64>,
}

/// `Transport` backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    body_limit: Option<u64>,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_config(&TransportConfig::default())
    }

    pub fn with_config(config: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout)
            .build()
            .new_agent();
        Self {
            agent,
            body_limit: config.body_limit,
        }
    }

    /// Wrap an agent built by the caller. If that agent treats HTTP statuses
    /// as errors, non-2xx responses surface as `ApiError::Transport` instead
    /// of `ApiError::HttpStatus`.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            body_limit: None,
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, None) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(url), headers).send(body.as_bytes())
            }
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
            (method @ (HttpMethod::Get | HttpMethod::Delete), Some(_)) => {
                return Err(ApiError::Transport(format!(
                    "{method} request cannot carry a body"
                )));
            }
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // ureq caps bodies at 10 MiB unless told otherwise.
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit.unwrap_or(u64::MAX))
            .read_to_string()?;
        debug!(status, bytes = body.len(), "response received");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn body_on_get_is_rejected_before_sending() {
        let request = HttpRequest::new(HttpMethod::Get, "http://127.0.0.1:9/x".to_string())
            .with_body("{}", "application/json");
        let err = UreqTransport::new().execute(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("GET request cannot carry a body"));
    }

    #[test]
    fn malformed_url_is_a_transport_error() {
        let request = HttpRequest::new(HttpMethod::Get, "not a url".to_string());
        let err = UreqTransport::new().execute(&request).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        // Bind then drop a listener so the port is very likely closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = TransportConfig {
            timeout: Some(Duration::from_secs(5)),
            ..TransportConfig::default()
        };
        let request = HttpRequest::new(HttpMethod::Get, format!("http://127.0.0.1:{port}/_all_dbs"));
        let err = UreqTransport::with_config(&config).execute(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}

//! HTTP implementation of the bus API.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Client;
use tracing::debug;

use crate::config::ApiConfig;

use super::{BookingRequest, BookingResponse, BusApi, Departure, UpstreamError};

/// Bus API client over HTTP, authenticated with a session cookie.
pub struct HttpBusApi {
    client: Client,
    config: ApiConfig,
}

impl HttpBusApi {
    /// Create a new client with the given configuration.
    pub fn new(config: ApiConfig) -> Result<Self, UpstreamError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs as u64));

        if config.force_ipv4 {
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }
        if config.http1_only {
            builder = builder.http1_only();
        }

        let client = builder
            .build()
            .map_err(|e| UpstreamError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn cookie(&self) -> String {
        format!("{}={}", self.config.cookie_name, self.config.token)
    }
}

#[async_trait]
impl BusApi for HttpBusApi {
    fn name(&self) -> &str {
        "http"
    }

    async fn current_departures(&self) -> Result<Vec<Departure>, UpstreamError> {
        let url = format!("{}/departure/current", self.base_url());
        debug!(url = %url, "Fetching departures");

        let response = self
            .client
            .get(&url)
            .header(COOKIE, self.cookie())
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_send_error)?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let departures = parse_departures(&body)?;
        debug!(count = departures.len(), "Departures fetched");
        Ok(departures)
    }

    async fn book(&self, request: &BookingRequest) -> Result<BookingResponse, UpstreamError> {
        let url = format!("{}/tickets/book", self.base_url());
        debug!(
            departure_id = request.departure_id,
            to_campus = request.to_campus,
            "Submitting booking"
        );

        let response = self
            .client
            .post(&url)
            .header(COOKIE, self.cookie())
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status().as_u16();
        let body = body_or_read_error(response.text().await);

        Ok(BookingResponse { status, body })
    }
}

/// Parse a departure listing body.
///
/// A login wall is served as an HTML page with status 200, so anything that
/// looks like markup is refused before JSON parsing.
pub(crate) fn parse_departures(body: &str) -> Result<Vec<Departure>, UpstreamError> {
    if body.trim_start().starts_with('<') {
        return Err(UpstreamError::LoginPage(truncate(body)));
    }

    serde_json::from_str(body)
        .map_err(|e| UpstreamError::Protocol(format!("Failed to parse departures: {}", e)))
}

/// Booking diagnostics keep the status even when the body cannot be read.
fn body_or_read_error(result: Result<String, reqwest::Error>) -> String {
    match result {
        Ok(body) => body,
        Err(e) => format!("<body unreadable: {}>", e),
    }
}

fn map_send_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else if e.is_connect() {
        UpstreamError::ConnectionFailed(e.to_string())
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_departures_valid() {
        let body = r#"[
            {"id": 1, "locked": false, "route": {"name": "Martil"}, "nbr_to_home": 2, "nbr_to_campus": 0},
            {"id": 2, "locked": true, "route": {"name": "Tetouan"}}
        ]"#;
        let deps = parse_departures(body).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].id, 1);
        assert!(deps[1].locked);
    }

    #[test]
    fn test_parse_departures_empty_list() {
        assert!(parse_departures("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_departures_html_is_login_page() {
        let err = parse_departures("<!DOCTYPE html><html>Login</html>").unwrap_err();
        assert!(matches!(err, UpstreamError::LoginPage(ref body) if body.contains("Login")));

        let err = parse_departures("\n  <html></html>").unwrap_err();
        assert!(matches!(err, UpstreamError::LoginPage(_)));
    }

    #[test]
    fn test_parse_departures_wrong_shape() {
        let err = parse_departures(r#"{"error": "nope"}"#).unwrap_err();
        assert!(matches!(err, UpstreamError::Protocol(_)));

        let err = parse_departures("not json").unwrap_err();
        assert!(matches!(err, UpstreamError::Protocol(_)));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:9000/api/".to_string(),
            token: "t".to_string(),
            ..Default::default()
        };
        let api = HttpBusApi::new(config).unwrap();
        assert_eq!(api.base_url(), "http://localhost:9000/api");
        assert_eq!(api.cookie(), "le_token=t");
    }

    #[tokio::test]
    async fn test_unreadable_body_keeps_error_text() {
        assert_eq!(body_or_read_error(Ok("seat taken".to_string())), "seat taken");

        let err = Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();
        let body = body_or_read_error(Err(err));
        assert!(body.starts_with("<body unreadable: "), "got {:?}", body);
        assert!(body.len() > "<body unreadable: >".len());
    }
}

//! SondeHub amateur telemetry upload.
//!
//! The API takes a JSON array of records on `PUT /amateur/telemetry` and
//! answers with the plain text `^v^ telm logged` when it stored them.
//! Uploads are best effort: callers log failures and move on.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, trace};

use crate::pipeline::TelemetryRecord;
use crate::{SOFTWARE_NAME, VERSION};

/// Production API base URL.
pub const DEFAULT_API_URL: &str = "https://api.v2.sondehub.org";

/// Response body for a stored upload.
pub const TELEMETRY_ACCEPTED: &str = "^v^ telm logged";

const TELEMETRY_PATH: &str = "/amateur/telemetry";

/// Upload failures.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Records could not be encoded.
    #[error("Failed to encode telemetry: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request did not complete.
    #[error("Telemetry request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} from SondeHub: {body}")]
    HttpStatus { status: u16, body: String },

    /// Server answered 2xx but did not confirm the upload.
    #[error("SondeHub did not log telemetry: {body}")]
    Rejected { body: String },
}

/// Destination for telemetry records.
pub trait TelemetrySink: Send + Sync {
    /// Uploads a batch of records.
    fn upload(
        &self,
        records: Vec<TelemetryRecord>,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// [`TelemetrySink`] for the SondeHub HTTP API.
#[derive(Clone)]
pub struct SondehubClient {
    client: reqwest::Client,
    endpoint: String,
}

impl SondehubClient {
    /// Creates a client for the API at `api_url`.
    ///
    /// No request timeout is set beyond the transport defaults.
    pub fn new(api_url: &str) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("{}/{}", SOFTWARE_NAME, VERSION))
            .build()
            .map_err(SinkError::Client)?;

        Ok(Self::with_client(client, api_url))
    }

    /// Uses an already configured `reqwest` client.
    pub fn with_client(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", api_url.trim_end_matches('/'), TELEMETRY_PATH),
        }
    }

    /// Full telemetry endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TelemetrySink for SondehubClient {
    async fn upload(&self, records: Vec<TelemetryRecord>) -> Result<(), SinkError> {
        let body = serde_json::to_string(&records)?;
        trace!(url = %self.endpoint, body = %body, "Uploading telemetry");

        let response = self
            .client
            .put(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                debug!(
                    url = %self.endpoint,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "Telemetry request failed"
                );
                SinkError::Transport(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(SinkError::Transport)?;

        if !status.is_success() {
            return Err(SinkError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim() != TELEMETRY_ACCEPTED {
            return Err(SinkError::Rejected { body: text });
        }

        debug!(records = records.len(), "Telemetry logged by SondeHub");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single HTTP response and returns the raw request it got.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= header_end + 4 + length || n == 0 {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).to_string()
        });

        (url, handle)
    }

    fn local_client(url: &str) -> SondehubClient {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        SondehubClient::with_client(client, url)
    }

    fn record() -> TelemetryRecord {
        serde_json::from_value(serde_json::json!({
            "software_name": "aprs2sondehub",
            "software_version": "1.0.0",
            "uploader_callsign": "SR9NDJ-10",
            "comment": "pico",
            "detail": "",
            "modulation": "APRS",
            "time_received": "2024-06-21T12:00:00.000Z",
            "datetime": "2024-06-21T12:00:00.000Z",
            "payload_callsign": "SQ2IPS-PICO",
            "lat": 50.5,
            "lon": 19.25,
            "alt": 10000.0,
            "sats": 9,
            "has_fix": "1",
            "power": 20,
            "solar_elevation": 58.1
        }))
        .unwrap()
    }

    #[test]
    fn test_endpoint_joins_path() {
        let client = SondehubClient::new("https://api.v2.sondehub.org/").unwrap();
        assert_eq!(client.endpoint(), "https://api.v2.sondehub.org/amateur/telemetry");
    }

    #[tokio::test]
    async fn test_upload_accepted() {
        let (url, server) = serve_once("200 OK", TELEMETRY_ACCEPTED).await;
        let client = local_client(&url);

        client.upload(vec![record()]).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /amateur/telemetry HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("accept: text/plain"));
        assert!(request.contains("\"payload_callsign\":\"SQ2IPS-PICO\""));
        assert!(request.contains("\r\n\r\n["));
    }

    #[tokio::test]
    async fn test_upload_unexpected_body() {
        let (url, server) = serve_once("200 OK", "nope").await;
        let client = local_client(&url);

        let err = client.upload(vec![record()]).await.unwrap_err();
        assert!(matches!(err, SinkError::Rejected { ref body } if body == "nope"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_http_error() {
        let (url, server) = serve_once("500 Internal Server Error", "boom").await;
        let client = local_client(&url);

        let err = client.upload(vec![record()]).await.unwrap_err();
        assert!(matches!(err, SinkError::HttpStatus { status: 500, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = local_client(&url);
        let err = client.upload(vec![record()]).await.unwrap_err();
        assert!(matches!(err, SinkError::Transport(_)));
    }
}

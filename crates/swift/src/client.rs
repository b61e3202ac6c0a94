//! reqwest-backed transport
//!
//! Resolves request paths against the profile's storage URL and moves bodies
//! as streams in both directions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, HeaderValue};
use url::Url;

use stk_core::{Client, Error, Headers, HttpRequest, HttpResponse, Profile, Result, Transport};

/// Transport for one Swift account
#[derive(Debug, Clone)]
pub struct SwiftTransport {
    http_client: reqwest::Client,
    endpoint: Url,
}

impl SwiftTransport {
    /// Build a transport from a profile's endpoint, TLS and timeout settings
    pub fn new(profile: &Profile) -> Result<Self> {
        let endpoint = profile.endpoint_url()?;
        let timeout = profile.timeout_config();

        let http_client = reqwest::Client::builder()
            .danger_accept_invalid_certs(profile.insecure)
            .connect_timeout(Duration::from_millis(timeout.connect_ms))
            .read_timeout(Duration::from_millis(timeout.read_ms))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            endpoint,
        })
    }

    /// Full URL for a request path and its query pairs
    ///
    /// Each path segment is percent-encoded on its own so `/` inside object
    /// names stays a separator, as Swift expects.
    fn request_url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = self.endpoint.as_str().trim_end_matches('/').to_string();

        let path = path.trim_start_matches('/');
        if !path.is_empty() {
            for segment in path.split('/') {
                url.push('/');
                url.push_str(&urlencoding::encode(segment));
            }
        }

        if !query.is_empty() {
            let query_string = query
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query_string);
        }

        Ok(Url::parse(&url)?)
    }
}

#[async_trait]
impl Transport for SwiftTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.request_url(&request.path, &request.query)?;
        let mut headers = request.headers.to_header_map()?;

        let mut builder = self.http_client.request(request.method, url);
        if let Some(body) = request.body {
            if let Some(length) = body.content_length() {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
            }
            builder = builder.body(reqwest::Body::wrap_stream(body.into_stream()));
        }

        let mut response = builder
            .headers(headers)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        let response_headers = Headers::from(response.headers());

        let body = match request.sink {
            Some(mut sink) if status.is_success() => {
                let mut received = 0usize;
                while let Some(chunk) = response
                    .chunk()
                    .await
                    .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?
                {
                    received += chunk.len();
                    tracing::trace!(len = chunk.len(), received, "Streaming chunk to sink");
                    sink.write_chunk(&chunk)?;
                }
                bytes::Bytes::new()
            }
            _ => response
                .bytes()
                .await
                .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?,
        };

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

/// Create a client for a profile, authorized with the profile's token
pub fn connect(profile: &Profile) -> Result<Client> {
    let client = Client::new(SwiftTransport::new(profile)?);
    client.set_token(profile.token());
    Ok(client)
}

//! HTTP fetcher
//!
//! Builds the crawl client and performs GET requests, classifying transport
//! failures into readable error messages. Response bodies are returned as
//! raw bytes; decoding is the caller's concern.

use reqwest::Client;
use std::time::{Duration, Instant};

/// Result of fetching one URL
#[derive(Debug)]
pub enum FetchResult {
    /// Got an HTTP response (any status code)
    Response {
        status_code: u16,
        content_type: Option<String>,
        /// Response headers in arrival order
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        response_time_ms: u64,
    },

    /// Transport failure before any response arrived
    TransportError {
        error: String,
        response_time_ms: u64,
    },
}

/// Builds the HTTP client used for a crawl
///
/// Redirects are followed transparently; the page is recorded under the URL
/// it was queued as. Compressed responses are decompressed by the client,
/// though some servers mislabel bodies, so callers still probe for gzip.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and classifies the outcome
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let start = Instant::now();

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::TransportError {
                error: classify_error(&e),
                response_time_ms: start.elapsed().as_millis() as u64,
            };
        }
    };

    let status_code = response.status().as_u16();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();

    match response.bytes().await {
        Ok(body) => FetchResult::Response {
            status_code,
            content_type,
            headers,
            body: body.to_vec(),
            response_time_ms: start.elapsed().as_millis() as u64,
        },
        Err(e) => FetchResult::TransportError {
            error: classify_error(&e),
            response_time_ms: start.elapsed().as_millis() as u64,
        },
    }
}

fn classify_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client("waczgen/1.0").is_ok());
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(
                    "<html><body>hi</body></html>",
                    "text/html; charset=utf-8",
                ),
            )
            .mount(&server)
            .await;

        let client = build_http_client("test/1.0").unwrap();
        let result = fetch_url(&client, &format!("{}/page", server.uri())).await;

        match result {
            FetchResult::Response {
                status_code,
                content_type,
                headers,
                body,
                ..
            } => {
                assert_eq!(status_code, 200);
                assert_eq!(content_type.as_deref(), Some("text/html; charset=utf-8"));
                assert!(headers.iter().any(|(n, _)| n == "content-type"));
                assert_eq!(body, b"<html><body>hi</body></html>");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_still_returns_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = build_http_client("test/1.0").unwrap();
        let result = fetch_url(&client, &format!("{}/missing", server.uri())).await;

        match result {
            FetchResult::Response { status_code, .. } => assert_eq!(status_code, 404),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_transport_error() {
        let client = build_http_client("test/1.0").unwrap();
        let result = fetch_url(&client, "http://127.0.0.1:1/nope").await;
        assert!(matches!(result, FetchResult::TransportError { .. }));
    }
}

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;

use crate::core::errors::ApiError;

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub max_bytes: usize,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
}

/// Raw page fetch. Any HTTP status is returned as-is; transport failures,
/// timeouts and size-cap violations are errors.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse, ApiError>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse, ApiError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ApiError::BadRequest(format!("invalid URL {}: {}", url, e)))?;
        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ApiError::BadRequest(
                "Only http/https URLs are supported".to_string(),
            ));
        }

        let mut request = self.client.get(parsed).timeout(options.timeout);
        if let Some(agent) = &options.user_agent {
            request = request.header(reqwest::header::USER_AGENT, agent);
        }

        let response = request.send().await.map_err(ApiError::from_reqwest)?;
        let status = response.status().as_u16();

        if let Some(length) = response.content_length() {
            if length as usize > options.max_bytes {
                return Err(ApiError::Upstream(format!(
                    "Fetched content exceeded max size of {} bytes",
                    options.max_bytes
                )));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk_result) = stream.next().await {
            let chunk = chunk_result.map_err(ApiError::from_reqwest)?;
            if bytes.len().saturating_add(chunk.len()) > options.max_bytes {
                return Err(ApiError::Upstream(format!(
                    "Fetched content exceeded max size of {} bytes",
                    options.max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(FetchResponse {
            status,
            body: String::from_utf8_lossy(&bytes).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::HeaderMap, http::StatusCode, routing::get, Router};

    use super::*;

    async fn spawn_fixture_server() -> String {
        let app = Router::new()
            .route(
                "/article",
                get(|| async {
                    (
                        [("content-type", "text/html")],
                        "<html><body><p>hello</p></body></html>",
                    )
                }),
            )
            .route("/big", get(|| async { "x".repeat(4096) }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(3)).await;
                    "late"
                }),
            )
            .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nope") }))
            .route(
                "/agent",
                get(|headers: HeaderMap| async move {
                    headers
                        .get("user-agent")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string()
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("axum serve");
        });
        format!("http://{}", addr)
    }

    fn options(max_bytes: usize, timeout_ms: u64) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_millis(timeout_ms),
            max_bytes,
            user_agent: Some("ragpress-test/1.0".to_string()),
        }
    }

    #[tokio::test]
    async fn fetches_body_and_sends_user_agent() {
        let base = spawn_fixture_server().await;
        let fetcher = HttpFetcher::new(Client::new());

        let page = fetcher
            .fetch(&format!("{}/article", base), &options(1024, 2000))
            .await
            .expect("page");
        assert_eq!(page.status, 200);
        assert!(page.body.contains("<p>hello</p>"));

        let agent = fetcher
            .fetch(&format!("{}/agent", base), &options(1024, 2000))
            .await
            .expect("agent");
        assert_eq!(agent.body, "ragpress-test/1.0");
    }

    #[tokio::test]
    async fn non_success_status_is_returned_not_raised() {
        let base = spawn_fixture_server().await;
        let fetcher = HttpFetcher::new(Client::new());

        let page = fetcher
            .fetch(&format!("{}/missing", base), &options(1024, 2000))
            .await
            .expect("response");
        assert_eq!(page.status, 404);
    }

    #[tokio::test]
    async fn size_cap_and_timeout_are_enforced() {
        let base = spawn_fixture_server().await;
        let fetcher = HttpFetcher::new(Client::new());

        let too_big = fetcher
            .fetch(&format!("{}/big", base), &options(1024, 2000))
            .await
            .expect_err("over cap");
        assert!(too_big.to_string().contains("exceeded max size"));

        let too_slow = fetcher
            .fetch(&format!("{}/slow", base), &options(1024, 200))
            .await
            .expect_err("timeout");
        assert!(matches!(too_slow, ApiError::Timeout(_)));
    }

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        let fetcher = HttpFetcher::new(Client::new());
        let err = fetcher
            .fetch("file:///etc/passwd", &options(1024, 2000))
            .await
            .expect_err("scheme");
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}

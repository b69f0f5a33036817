use std::sync::Arc;

use async_trait::async_trait;
use rand::seq::IndexedRandom;

use super::{PageScraper, ScrapeBackendKind, ScrapeOutcome, ScrapeResult};
use crate::core::config::settings::ScrapeSettings;
use crate::tools::fetch::{FetchOptions, PageFetcher};

pub const DEFAULT_USER_AGENTS: [&str; 11] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Linux; Android 7.0; RCT6213W23) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.90 Safari/537.36",
    "Mozilla/5.0 (Linux; Android 6.0.1; SAMSUNG SM-S727VL) AppleWebKit/537.36 (KHTML, like Gecko) SamsungBrowser/13.2 Chrome/83.0.4103.106 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 11; Pixel 4 XL) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.101 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; arm_64; Android 8.0.0; SM-G930F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.138 YaBrowser/20.4.3.90.00 SA/1 TA/5.1 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 9; SM-J737U) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.105 Mobile Safari/537.36",
    "Dalvik/2.1.0 (Linux; U; Android 11; Mi A2 Build/RD1A.201105.003.C1)",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3955.0 Safari/537.36",
    "Mozilla/5.0 (Linux; arm; Android 7.0; BQ-5005L) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/81.0.4044.96 YaBrowser/20.4.0.237.00 SA/1 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 10; HD1901) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.90 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 8.0.0; SM-G930V) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.86 Mobile Safari/537.36",
];

const REDACTED: &str = "****";

/// Standard and proxied scraping over a shared page fetcher.
#[derive(Clone)]
pub struct ScrapeService {
    fetcher: Arc<dyn PageFetcher>,
    settings: ScrapeSettings,
    user_agents: Vec<String>,
}

struct PreparedRequest {
    target: String,
    display: String,
    options: FetchOptions,
}

impl ScrapeService {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: ScrapeSettings) -> Self {
        let user_agents = if settings.user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
        } else {
            settings.user_agents.clone()
        };
        Self {
            fetcher,
            settings,
            user_agents,
        }
    }

    pub fn proxy_available(&self) -> bool {
        self.settings.proxy_api_key.is_some()
    }

    /// Backend that will actually serve a request for `requested`.
    pub fn resolve_backend(&self, requested: ScrapeBackendKind) -> ScrapeBackendKind {
        match requested {
            ScrapeBackendKind::Proxied if !self.proxy_available() => ScrapeBackendKind::Standard,
            other => other,
        }
    }

    fn pick_user_agent(&self) -> Option<String> {
        self.user_agents.choose(&mut rand::rng()).cloned()
    }

    fn prepare_standard(&self, url: &str) -> PreparedRequest {
        PreparedRequest {
            target: url.to_string(),
            display: url.to_string(),
            options: FetchOptions {
                timeout: self.settings.standard_timeout,
                max_bytes: self.settings.max_bytes,
                user_agent: self.pick_user_agent(),
            },
        }
    }

    fn prepare_proxied(&self, url: &str, api_key: &str) -> Result<PreparedRequest, String> {
        let endpoint = &self.settings.proxy_endpoint;
        let target = reqwest::Url::parse_with_params(endpoint, &[("api_key", api_key), ("url", url)])
            .map_err(|e| format!("invalid proxy endpoint {}: {}", endpoint, e))?;
        let display = reqwest::Url::parse_with_params(endpoint, &[("api_key", REDACTED), ("url", url)])
            .map(|u| u.to_string())
            .unwrap_or_else(|_| endpoint.clone());

        Ok(PreparedRequest {
            target: target.to_string(),
            display,
            options: FetchOptions {
                timeout: self.settings.proxied_timeout,
                max_bytes: self.settings.max_bytes,
                user_agent: None,
            },
        })
    }

    fn snapshot(&self, body: &str) -> String {
        body.chars().take(self.settings.snapshot_chars).collect()
    }
}

#[async_trait]
impl PageScraper for ScrapeService {
    async fn scrape(&self, url: &str, backend: ScrapeBackendKind) -> ScrapeResult {
        let served_by = self.resolve_backend(backend);
        if served_by != backend {
            tracing::warn!(
                "[scrape] proxied backend has no API key, using standard for {}",
                url
            );
        }

        let prepared = match (served_by, self.settings.proxy_api_key.as_deref()) {
            (ScrapeBackendKind::Proxied, Some(api_key)) => self.prepare_proxied(url, api_key),
            _ => Ok(self.prepare_standard(url)),
        };
        let prepared = match prepared {
            Ok(prepared) => prepared,
            Err(error) => {
                tracing::warn!("[scrape] {}: {}", url, error);
                return ScrapeResult {
                    url: url.to_string(),
                    backend: served_by,
                    user_agent: None,
                    raw_request: self.settings.proxy_endpoint.clone(),
                    raw_response: None,
                    outcome: ScrapeOutcome::Failed { error },
                };
            }
        };

        tracing::debug!("[scrape] {} via {}", url, served_by.as_str());
        let user_agent = prepared.options.user_agent.clone();
        let (raw_response, outcome) = match self.fetcher.fetch(&prepared.target, &prepared.options).await {
            Ok(response) if response.status == 200 => (
                Some(self.snapshot(&response.body)),
                ScrapeOutcome::Fetched {
                    body: response.body,
                },
            ),
            Ok(response) => (
                Some(self.snapshot(&response.body)),
                ScrapeOutcome::Failed {
                    error: format!("Request failed with status {}", response.status),
                },
            ),
            Err(err) => (
                None,
                ScrapeOutcome::Failed {
                    error: err.to_string(),
                },
            ),
        };

        if let ScrapeOutcome::Failed { error } = &outcome {
            tracing::warn!("[scrape] {} failed via {}: {}", url, served_by.as_str(), error);
        }

        ScrapeResult {
            url: url.to_string(),
            backend: served_by,
            user_agent,
            raw_request: prepared.display,
            raw_response,
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::core::config::Settings;
    use crate::core::errors::ApiError;
    use crate::tools::fetch::FetchResponse;

    struct RecordingFetcher {
        status: u16,
        body: String,
        fail_with: Option<String>,
        calls: Mutex<Vec<(String, FetchOptions)>>,
    }

    impl RecordingFetcher {
        fn ok(body: &str) -> Arc<Self> {
            Arc::new(Self {
                status: 200,
                body: body.to_string(),
                fail_with: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn status(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: "blocked".to_string(),
                fail_with: None,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn error(message: &str) -> Arc<Self> {
            Arc::new(Self {
                status: 0,
                body: String::new(),
                fail_with: Some(message.to_string()),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for RecordingFetcher {
        async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResponse, ApiError> {
            self.calls
                .lock()
                .expect("lock")
                .push((url.to_string(), options.clone()));
            if let Some(message) = &self.fail_with {
                return Err(ApiError::Timeout(message.clone()));
            }
            Ok(FetchResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn scrape_settings(proxy_key: Option<&str>) -> ScrapeSettings {
        let mut settings = Settings::default().scrape;
        settings.proxy_api_key = proxy_key.map(ToString::to_string);
        settings.snapshot_chars = 8;
        settings
    }

    #[tokio::test]
    async fn standard_scrape_uses_pool_agent_and_short_timeout() {
        let fetcher = RecordingFetcher::ok("<html>article body</html>");
        let service = ScrapeService::new(fetcher.clone(), scrape_settings(None));

        let result = service
            .scrape("https://a.example/post", ScrapeBackendKind::Standard)
            .await;

        assert!(result.is_success());
        assert_eq!(result.backend, ScrapeBackendKind::Standard);
        assert_eq!(result.raw_request, "https://a.example/post");
        assert_eq!(result.raw_response.as_deref(), Some("<html>ar"));
        let agent = result.user_agent.clone().expect("agent");
        assert!(DEFAULT_USER_AGENTS.contains(&agent.as_str()));

        let calls = fetcher.calls.lock().expect("lock");
        assert_eq!(calls[0].0, "https://a.example/post");
        assert_eq!(calls[0].1.timeout, Duration::from_secs(15));
        assert_eq!(calls[0].1.user_agent.as_deref(), Some(agent.as_str()));
    }

    #[tokio::test]
    async fn proxied_scrape_routes_through_endpoint_and_masks_key() {
        let fetcher = RecordingFetcher::ok("<html>rendered</html>");
        let service = ScrapeService::new(fetcher.clone(), scrape_settings(Some("secret-key")));

        let result = service
            .scrape("https://b.example/a?x=1", ScrapeBackendKind::Proxied)
            .await;

        assert!(result.is_success());
        assert_eq!(result.backend, ScrapeBackendKind::Proxied);
        assert!(result.raw_request.contains("api_key=****"));
        assert!(!result.raw_request.contains("secret-key"));
        assert!(result.user_agent.is_none());

        let calls = fetcher.calls.lock().expect("lock");
        let (target, options) = &calls[0];
        assert!(target.starts_with("http://api.scraperapi.com/?api_key=secret-key&url="));
        assert!(target.contains("https%3A%2F%2Fb.example%2Fa%3Fx%3D1"));
        assert_eq!(options.timeout, Duration::from_secs(70));
    }

    #[tokio::test]
    async fn proxied_without_key_falls_back_to_standard() {
        let fetcher = RecordingFetcher::ok("<html>direct</html>");
        let service = ScrapeService::new(fetcher.clone(), scrape_settings(None));

        let result = service
            .scrape("https://c.example", ScrapeBackendKind::Proxied)
            .await;

        assert!(result.is_success());
        assert_eq!(result.backend, ScrapeBackendKind::Standard);
        assert_eq!(fetcher.calls.lock().expect("lock")[0].0, "https://c.example");
    }

    #[tokio::test]
    async fn non_200_and_transport_errors_become_failures() {
        let blocked = ScrapeService::new(RecordingFetcher::status(403), scrape_settings(None));
        let result = blocked
            .scrape("https://d.example", ScrapeBackendKind::Standard)
            .await;
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("Request failed with status 403"));
        assert_eq!(result.raw_response.as_deref(), Some("blocked"));

        let timed_out = ScrapeService::new(RecordingFetcher::error("15s elapsed"), scrape_settings(None));
        let result = timed_out
            .scrape("https://e.example", ScrapeBackendKind::Standard)
            .await;
        assert!(result.body().is_none());
        assert_eq!(result.error(), Some("timed out: 15s elapsed"));
        assert!(result.raw_response.is_none());
    }
}

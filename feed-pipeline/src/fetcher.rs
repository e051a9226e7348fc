use crate::types::{FetchConfig, PipelineError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

/// Shared HTTP client used by the built-in network stages.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
    rate_limiter: Mutex<HashMap<String, Instant>>,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            config,
            rate_limiter: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET a page and return its body, retrying transient failures.
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        debug!("Fetching page: {}", url);
        self.apply_rate_limit(url).await?;

        let mut backoff = self.backoff();
        let mut attempt = 0;
        loop {
            let outcome = match self.client.get(url).send().await {
                Ok(response) => check_status(response),
                Err(e) => Err(PipelineError::Http(e)),
            };
            let error = match outcome {
                Ok(response) => return Ok(response.text().await?),
                Err(e) => e,
            };

            if attempt >= self.config.max_retries {
                return Err(error);
            }
            match backoff.next_backoff() {
                Some(delay) => {
                    warn!(
                        "Attempt {} failed for {}, retrying in {:?}: {}",
                        attempt + 1,
                        url,
                        delay,
                        error
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(error),
            }
        }
    }

    /// POST a body once; any non-2xx status is an error.
    pub async fn post(&self, url: &str, content_type: &str, body: Vec<u8>) -> Result<u16> {
        debug!("Posting {} bytes to {}", body.len(), url);
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        let response = check_status(response)?;
        Ok(response.status().as_u16())
    }

    fn backoff(&self) -> ExponentialBackoff<backoff::SystemClock> {
        let delay = Duration::from_secs(self.config.retry_delay_seconds);
        ExponentialBackoff {
            current_interval: delay,
            initial_interval: delay,
            max_interval: delay * 32,
            multiplier: 2.0,
            max_elapsed_time: Some(delay * 60),
            ..Default::default()
        }
    }

    async fn apply_rate_limit(&self, url: &str) -> Result<()> {
        if self.config.min_host_interval_ms == 0 {
            return Ok(());
        }
        let host = Url::parse(url)?.host_str().unwrap_or("").to_string();
        let min_interval = Duration::from_millis(self.config.min_host_interval_ms);

        let mut rate_limiter = self.rate_limiter.lock().await;
        if let Some(last_request) = rate_limiter.get(&host) {
            let elapsed = last_request.elapsed();
            if elapsed < min_interval {
                let wait_time = min_interval - elapsed;
                debug!("Rate limiting {}: waiting {:?}", host, wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
        rate_limiter.insert(host, Instant::now());
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(PipelineError::General(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown")
        )))
    }
}

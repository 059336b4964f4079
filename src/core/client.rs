// src/core/client.rs

use color_eyre::eyre::{Result, WrapErr};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use crate::core::models::{Payload, Timing};

/// The outcome of one request/response exchange with the scanning endpoint.
#[derive(Debug)]
pub struct Exchange {
    pub http_code: u16,
    pub body: Value,
    /// Measured from just before the request is sent until the full body has been read.
    pub elapsed: Duration,
}

/// A thin client around the scanning endpoint.
pub struct ScanClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl ScanClient {
    /// Builds a client for `endpoint`.
    ///
    /// # Arguments
    /// * `endpoint` - Full URL of the scan route, e.g. `http://localhost:8081/scan-open-ports`.
    /// * `timeout` - Optional whole-request timeout; `None` waits indefinitely.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .wrap_err_with(|| format!("Invalid scan endpoint URL: {}", endpoint))?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().wrap_err("Failed to build HTTP client")?;

        info!(endpoint = %endpoint, ?timeout, "Scan client ready.");
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts `payload` as JSON and parses the response body as JSON.
    ///
    /// The HTTP status is recorded but never treated as a failure on its own;
    /// only transport errors and a body that is not JSON are.
    pub async fn submit(&self, payload: &Payload) -> Result<Exchange> {
        debug!(
            endpoint = %self.endpoint,
            ?payload,
            timing = payload.timing.map(Timing::nickname),
            "Sending scan request."
        );

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .wrap_err("Request to scan endpoint failed")?;
        let http_code = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .wrap_err("Failed to read response body")?;
        let elapsed = start.elapsed();

        debug!(http_code, bytes = bytes.len(), elapsed_ms = elapsed.as_millis() as u64, "Received scan response.");

        let body: Value =
            serde_json::from_slice(&bytes).wrap_err("Response body is not valid JSON")?;

        Ok(Exchange { http_code, body, elapsed })
    }
}

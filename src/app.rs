// src/app.rs

use chrono::Local;
use color_eyre::eyre::{Result, WrapErr};
use std::path::Path;
use tracing::{error, info, warn};

use crate::config::RunConfig;
use crate::core::catalog::{BaseCase, CaseGroup, VARIANTS_PER_CASE};
use crate::core::client::ScanClient;
use crate::core::models::{Payload, ResultRecord, RunOutcome};
use crate::core::report::{SummaryReport, write_summary};
use crate::core::results::{RunLog, banner, error_line, progress_block, write_result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Init,
    Running,
    Summarizing,
    Done,
}

/// Runs the catalog against the scanning endpoint, one request at a time.
pub struct Driver {
    state: DriverState,
    config: RunConfig,
    client: ScanClient,
    log: RunLog,
    outcome: RunOutcome,
}

impl Driver {
    /// Prepares a run: builds the HTTP client, creates the results directory
    /// and opens a fresh run log.
    pub async fn new(config: RunConfig) -> Result<Self> {
        let client = ScanClient::new(&config.endpoint, config.request_timeout)?;

        tokio::fs::create_dir_all(&config.results_dir)
            .await
            .wrap_err_with(|| format!("Failed to create results directory {}", config.results_dir.display()))?;

        let log = RunLog::create(&config.log_dir, &Local::now(), &config.target, &config.results_dir)?;
        info!(log = %log.path().display(), results_dir = %config.results_dir.display(), "Driver initialized.");

        Ok(Self {
            state: DriverState::Init,
            config,
            client,
            log,
            outcome: RunOutcome::default(),
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn outcome(&self) -> &RunOutcome {
        &self.outcome
    }

    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Executes every timing variant of every base case in order, then writes the summary.
    ///
    /// Individual test failures never abort the run. An error is returned only
    /// when the run log or the summary cannot be written.
    pub async fn run(&mut self, base_cases: &[BaseCase]) -> Result<SummaryReport> {
        self.state = DriverState::Running;
        print!("{}", banner(&self.config.target, &self.config.results_dir, self.log.path()));
        info!(
            base_cases = base_cases.len(),
            executions = base_cases.len() * VARIANTS_PER_CASE,
            endpoint = %self.client.endpoint(),
            "Starting run."
        );

        let mut current_group: Option<CaseGroup> = None;
        for base in base_cases {
            if current_group != Some(base.group) {
                println!("📋 Starting {}...", base.group);
                current_group = Some(base.group);
            }
            for case in base.expand(&self.config.target) {
                let json_payload = case.payload.to_json().wrap_err("Failed to encode payload")?;
                self.run_test(&case.name, &json_payload).await?;
            }
        }

        println!("🎉 All Tests Completed!");
        println!("Total tests run: {}", self.outcome.attempted());
        println!("Succeeded: {}, failed: {}", self.outcome.succeeded.len(), self.outcome.failed.len());
        println!("Results saved in: {}/", self.config.results_dir.display());
        println!("Log file: {}", self.log.path().display());

        self.state = DriverState::Summarizing;
        println!("📊 Generating Summary Report...");
        let report = write_summary(
            &self.config.results_dir,
            &self.config.summary_path(),
            &self.config.target,
            &Local::now().naive_local(),
        )
        .await?;
        println!("Summary report saved to: {}", report.path.display());
        println!("🚀 Testing Complete! Check {}/ for all results.", self.config.results_dir.display());

        self.state = DriverState::Done;
        info!(
            state = ?self.state,
            succeeded = self.outcome.succeeded.len(),
            failed = self.outcome.failed.len(),
            json_files = report.total(),
            "Run finished."
        );
        Ok(report)
    }

    /// Runs a single test case given its name and JSON-encoded payload.
    ///
    /// A failure is printed, appended to the run log and tallied; it is not
    /// returned. The returned error means the run log itself is unwritable.
    pub async fn run_test(&mut self, test_name: &str, json_payload: &str) -> Result<()> {
        println!("Testing: {}", test_name);
        println!("Payload: {}", json_payload);

        match self.execute(test_name, json_payload).await {
            Ok(()) => {
                self.outcome.succeeded.push(test_name.to_string());
                tokio::time::sleep(self.config.request_delay).await;
                Ok(())
            }
            Err(e) => {
                let message = format!("{:#}", e);
                error!(test_name, error = %message, "Test case failed.");
                println!("Error in {}: {}", test_name, message);
                self.outcome.failed.push((test_name.to_string(), message.clone()));
                self.log.append(&error_line(test_name, &message))
            }
        }
    }

    async fn execute(&mut self, test_name: &str, json_payload: &str) -> Result<()> {
        let payload: Payload = serde_json::from_str(json_payload).wrap_err("Failed to parse payload")?;
        let exchange = self.client.submit(&payload).await?;

        let record = ResultRecord {
            test_name: test_name.to_string(),
            payload,
            response: exchange.body,
            http_code: exchange.http_code,
            time_taken: exchange.elapsed.as_secs_f64(),
            timestamp: Local::now().naive_local(),
        };
        let output = write_result(&self.config.results_dir, &record).await?;

        println!("HTTP Code: {}", record.http_code);
        println!("Time: {:.2}s", record.time_taken);
        println!("Output saved to: {}", output.display());
        println!("---");

        if !(200..300).contains(&record.http_code) {
            warn!(test_name, http_code = record.http_code, "Endpoint answered with a non-success status.");
        }
        info!(test_name, http_code = record.http_code, time_taken = record.time_taken, "Test case completed.");

        self.log.append(&progress_block(json_payload, &record, &output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::BASE_CASES;
    use axum::Router;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn spawn_endpoint(reply: &'static str) -> (String, Seen) {
        spawn_endpoint_with_status(StatusCode::OK, reply).await
    }

    /// Serves `reply` with `status` on `/scan-open-ports` and records every request it receives.
    async fn spawn_endpoint_with_status(status: StatusCode, reply: &'static str) -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let app = Router::new().route(
            "/scan-open-ports",
            post(move |headers: HeaderMap, body: String| {
                let recorder = recorder.clone();
                async move {
                    let content_type = headers
                        .get(CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
                    recorder.lock().unwrap().push((content_type, body));
                    (status, reply)
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}/scan-open-ports", addr), seen)
    }

    /// An endpoint on a port nothing listens on.
    async fn unreachable_endpoint() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/scan-open-ports", addr)
    }

    fn test_config(tmp: &TempDir, endpoint: String) -> RunConfig {
        RunConfig {
            endpoint,
            results_dir: tmp.path().join("test_results"),
            log_dir: tmp.path().to_path_buf(),
            request_delay: Duration::ZERO,
            request_timeout: Some(Duration::from_secs(10)),
            ..RunConfig::default()
        }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn single_o_produces_seven_result_files() {
        let tmp = TempDir::new().unwrap();
        let (endpoint, seen) = spawn_endpoint(r#"{"ok": true}"#).await;
        let config = test_config(&tmp, endpoint);
        let results_dir = config.results_dir.clone();

        let mut driver = Driver::new(config).await.unwrap();
        assert_eq!(driver.state(), DriverState::Init);
        let report = driver.run(&BASE_CASES[..1]).await.unwrap();
        assert_eq!(driver.state(), DriverState::Done);

        let untimed = read_json(&results_dir.join("single_O_no_timing.json"));
        assert_eq!(untimed["test_name"], "single_O_no_timing");
        assert_eq!(untimed["http_code"], 200);
        assert_eq!(untimed["response"], json!({"ok": true}));
        assert_eq!(untimed["payload"], json!({"target": "scanme.nmap.org", "flag_o": true}));
        assert!(untimed["time_taken"].as_f64().unwrap() >= 0.0);
        assert!(untimed["timestamp"].is_string());

        for timing in ["T0", "T1", "T2", "T3", "T4", "T5"] {
            let record = read_json(&results_dir.join(format!("single_O_{}.json", timing)));
            assert_eq!(
                record["payload"],
                json!({"target": "scanme.nmap.org", "flag_o": true, "timing": timing})
            );
            assert_eq!(record["response"], json!({"ok": true}));
        }

        assert_eq!(report.total(), 7);
        assert_eq!(driver.outcome().succeeded.len(), 7);
        assert!(driver.outcome().failed.is_empty());

        // Requests arrive in expansion order, each as JSON.
        let seen = seen.lock().unwrap();
        let timings: Vec<Option<&str>> = seen.iter().map(|(_, body)| body["timing"].as_str()).collect();
        assert_eq!(
            timings,
            vec![None, Some("T0"), Some("T1"), Some("T2"), Some("T3"), Some("T4"), Some("T5")]
        );
        assert!(seen.iter().all(|(ct, _)| ct.as_deref() == Some("application/json")));

        let log = std::fs::read_to_string(driver.log_path()).unwrap();
        assert_eq!(log.matches("---\n").count(), 7);
        assert!(log.contains("Testing: single_O_T5\n"));
    }

    #[tokio::test]
    async fn unreachable_endpoint_logs_errors_and_keeps_going() {
        let tmp = TempDir::new().unwrap();
        let config = test_config(&tmp, unreachable_endpoint().await);
        let results_dir = config.results_dir.clone();

        let mut driver = Driver::new(config).await.unwrap();
        let report = driver.run(&BASE_CASES[..1]).await.unwrap();

        assert_eq!(report.total(), 0);
        assert!(!results_dir.join("single_O_no_timing.json").exists());
        assert_eq!(driver.outcome().failed.len(), 7);
        assert_eq!(driver.outcome().attempted(), 7);

        let log = std::fs::read_to_string(driver.log_path()).unwrap();
        assert!(log.contains("Error in single_O_no_timing: Request to scan endpoint failed"));
        assert!(log.contains("Error in single_O_T5: "));
    }

    #[tokio::test]
    async fn non_json_response_writes_no_record() {
        let tmp = TempDir::new().unwrap();
        let (endpoint, seen) = spawn_endpoint("scan failed").await;
        let config = test_config(&tmp, endpoint);
        let results_dir = config.results_dir.clone();

        let mut driver = Driver::new(config).await.unwrap();
        driver
            .run_test("blank_scan_T3", r#"{"target": "scanme.nmap.org", "timing": "T3"}"#)
            .await
            .unwrap();

        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(!results_dir.join("blank_scan_T3.json").exists());
        let (name, message) = &driver.outcome().failed[0];
        assert_eq!(name, "blank_scan_T3");
        assert!(message.starts_with("Response body is not valid JSON"));
    }

    #[tokio::test]
    async fn invalid_payload_is_never_sent() {
        let tmp = TempDir::new().unwrap();
        let (endpoint, seen) = spawn_endpoint(r#"{"ok": true}"#).await;
        let mut driver = Driver::new(test_config(&tmp, endpoint)).await.unwrap();

        driver
            .run_test("bad_timing", r#"{"target": "scanme.nmap.org", "timing": "T7"}"#)
            .await
            .unwrap();

        assert!(seen.lock().unwrap().is_empty());
        let log = std::fs::read_to_string(driver.log_path()).unwrap();
        assert!(log.contains("Error in bad_timing: Failed to parse payload"));
    }

    #[tokio::test]
    async fn summary_includes_files_from_earlier_runs() {
        let tmp = TempDir::new().unwrap();
        let (endpoint, _) = spawn_endpoint(r#"{"ok": true}"#).await;
        let config = test_config(&tmp, endpoint);
        std::fs::create_dir_all(&config.results_dir).unwrap();
        std::fs::write(config.results_dir.join("leftover.json"), "{}").unwrap();
        let summary_path = config.summary_path();

        let mut driver = Driver::new(config).await.unwrap();
        let report = driver.run(&BASE_CASES[17..]).await.unwrap();

        assert_eq!(report.total(), 8);
        assert!(report.json_files.contains(&"leftover.json".to_string()));
        let text = std::fs::read_to_string(summary_path).unwrap();
        assert!(text.contains("blank_scan_no_timing.json\n"));
        assert!(text.ends_with("Total JSON files: 8\n"));
    }

    #[tokio::test]
    async fn server_error_status_is_still_recorded() {
        let tmp = TempDir::new().unwrap();
        let (endpoint, _) = spawn_endpoint_with_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"x"}"#).await;
        let config = test_config(&tmp, endpoint);
        let results_dir = config.results_dir.clone();

        let mut driver = Driver::new(config).await.unwrap();
        driver
            .run_test("single_sV_T4", r#"{"target": "scanme.nmap.org", "flag_sv": true, "timing": "T4"}"#)
            .await
            .unwrap();

        let record = read_json(&results_dir.join("single_sV_T4.json"));
        assert_eq!(record["http_code"], 500);
        assert_eq!(record["response"], json!({"error": "x"}));
        assert_eq!(driver.outcome().succeeded, vec!["single_sV_T4".to_string()]);
        assert!(driver.outcome().failed.is_empty());
    }

    #[tokio::test]
    async fn delay_follows_successes_only() {
        let delay = Duration::from_millis(100);

        let tmp = TempDir::new().unwrap();
        let (endpoint, _) = spawn_endpoint(r#"{"ok": true}"#).await;
        let config = RunConfig { request_delay: delay, ..test_config(&tmp, endpoint) };
        let mut driver = Driver::new(config).await.unwrap();
        let start = Instant::now();
        driver.run(&BASE_CASES[..1]).await.unwrap();
        assert_eq!(driver.outcome().succeeded.len(), 7);
        assert!(start.elapsed() >= delay * 7, "took {:?}", start.elapsed());

        let tmp = TempDir::new().unwrap();
        let config = RunConfig { request_delay: delay, ..test_config(&tmp, unreachable_endpoint().await) };
        let mut driver = Driver::new(config).await.unwrap();
        let start = Instant::now();
        driver.run(&BASE_CASES[..1]).await.unwrap();
        assert_eq!(driver.outcome().failed.len(), 7);
        assert!(start.elapsed() < delay * 3, "took {:?}", start.elapsed());
    }

    #[tokio::test]
    async fn invalid_endpoint_fails_at_startup() {
        let tmp = TempDir::new().unwrap();
        let result = Driver::new(test_config(&tmp, "not a url".to_string())).await;
        assert!(result.is_err());
    }
}

use crate::listing::ValidatedRecord;
use crate::DeliveryError;
use reqwest::Client;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Delivery attempts against the sink before falling back to the buffer
const DELIVERY_ATTEMPTS: u32 = 3;

/// Per-attempt timeout for sink calls
const SINK_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a record ended up
#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the remote sink (2xx)
    Sent,

    /// Appended to the local buffer; carries the delivery error when
    /// buffering was a fallback rather than the configured mode
    Buffered { after_failure: bool },
}

/// Delivers validated records to the sink, buffering on absence/failure
///
/// The buffer file is the dead-letter queue: newline-delimited JSON,
/// append-only, durable across runs. Each record is one atomic append,
/// so the file stays line-framed even if a future version introduces
/// more writers.
pub struct Emitter {
    sink_url: Option<String>,
    buffer_path: PathBuf,
    client: Client,
}

impl Emitter {
    pub fn new(sink_url: Option<String>, buffer_path: impl Into<PathBuf>) -> Self {
        Self {
            sink_url,
            buffer_path: buffer_path.into(),
            client: Client::new(),
        }
    }

    pub fn buffer_path(&self) -> &Path {
        &self.buffer_path
    }

    /// Emits one record: sink first, buffer as the fallback
    ///
    /// Delivery failure is never fatal; it is the caller's metrics
    /// concern. The only error out of here is a buffer write failure,
    /// which the orchestrator catches at the per-listing boundary.
    pub async fn emit(&self, record: &ValidatedRecord) -> crate::Result<Delivery> {
        let Some(sink_url) = &self.sink_url else {
            self.append_to_buffer(record)?;
            return Ok(Delivery::Buffered {
                after_failure: false,
            });
        };

        match self.deliver(sink_url, record).await {
            Ok(()) => Ok(Delivery::Sent),
            Err(error) => {
                tracing::warn!(
                    url = %record.url,
                    %error,
                    "delivery failed after {} attempts, buffering record",
                    DELIVERY_ATTEMPTS
                );
                self.append_to_buffer(record)?;
                Ok(Delivery::Buffered {
                    after_failure: true,
                })
            }
        }
    }

    /// POSTs the record, retrying transient failures
    async fn deliver(
        &self,
        sink_url: &str,
        record: &ValidatedRecord,
    ) -> std::result::Result<(), DeliveryError> {
        let mut last_error = None;

        for attempt in 1..=DELIVERY_ATTEMPTS {
            let result = self
                .client
                .post(sink_url)
                .timeout(SINK_TIMEOUT)
                .json(record)
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => {
                    let status = response.status().as_u16();
                    tracing::debug!(attempt, status, "sink rejected record");
                    last_error = Some(DeliveryError::SinkRejected { status });
                }
                Err(error) => {
                    tracing::debug!(attempt, %error, "sink unreachable");
                    last_error = Some(DeliveryError::SinkUnreachable(error));
                }
            }
        }

        Err(last_error.unwrap_or(DeliveryError::SinkRejected { status: 0 }))
    }

    /// One atomic append of one NDJSON line
    fn append_to_buffer(&self, record: &ValidatedRecord) -> crate::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.buffer_path)?;

        let line = serde_json::to_string(record).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        writeln!(file, "{}", line)?;

        tracing::debug!(url = %record.url, path = %self.buffer_path.display(), "record buffered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::RawSource;
    use chrono::Utc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(url: &str) -> ValidatedRecord {
        ValidatedRecord {
            url: url.to_string(),
            rent_pcm: 1200,
            beds: 3,
            address: "123 Fake Street".to_string(),
            postcode: "L12AB".to_string(),
            raw_source: RawSource::JsonLd,
            source: "zoopla",
            scraped_at: Utc::now(),
        }
    }

    fn read_lines(path: &Path) -> Vec<serde_json::Value> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(|line| serde_json::from_str(line).expect("buffer line must be valid JSON"))
            .collect()
    }

    #[tokio::test]
    async fn test_no_sink_buffers_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = dir.path().join("buffer.ndjson");
        let emitter = Emitter::new(None, &buffer);

        for i in 1..=3 {
            let disposition = emitter
                .emit(&record(&format!("https://www.zoopla.co.uk/to-rent/details/{}", i)))
                .await
                .unwrap();
            assert_eq!(disposition, Delivery::Buffered { after_failure: false });
        }

        let lines = read_lines(&buffer);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["url"], "https://www.zoopla.co.uk/to-rent/details/1");
        assert_eq!(lines[2]["url"], "https://www.zoopla.co.uk/to-rent/details/3");
    }

    #[tokio::test]
    async fn test_buffer_appends_across_emitter_instances() {
        // Durability across process restarts: a fresh emitter appends
        // to the same file rather than truncating it.
        let dir = tempfile::tempdir().unwrap();
        let buffer = dir.path().join("buffer.ndjson");

        let first = Emitter::new(None, &buffer);
        first.emit(&record("https://www.zoopla.co.uk/to-rent/details/1")).await.unwrap();
        drop(first);

        let second = Emitter::new(None, &buffer);
        second.emit(&record("https://www.zoopla.co.uk/to-rent/details/2")).await.unwrap();

        let lines = read_lines(&buffer);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["url"], "https://www.zoopla.co.uk/to-rent/details/1");
        assert_eq!(lines[1]["url"], "https://www.zoopla.co.uk/to-rent/details/2");
    }

    #[tokio::test]
    async fn test_sink_accepts_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let buffer = dir.path().join("buffer.ndjson");
        let emitter = Emitter::new(Some(format!("{}/hook", server.uri())), &buffer);

        let disposition = emitter
            .emit(&record("https://www.zoopla.co.uk/to-rent/details/1"))
            .await
            .unwrap();

        assert_eq!(disposition, Delivery::Sent);
        assert!(read_lines(&buffer).is_empty());
    }

    #[tokio::test]
    async fn test_rejecting_sink_falls_back_to_buffer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .expect(DELIVERY_ATTEMPTS as u64)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let buffer = dir.path().join("buffer.ndjson");
        let emitter = Emitter::new(Some(format!("{}/hook", server.uri())), &buffer);

        let disposition = emitter
            .emit(&record("https://www.zoopla.co.uk/to-rent/details/1"))
            .await
            .unwrap();

        assert_eq!(disposition, Delivery::Buffered { after_failure: true });
        assert_eq!(read_lines(&buffer).len(), 1);
    }

    #[tokio::test]
    async fn test_buffered_record_round_trips_schema_fields() {
        let dir = tempfile::tempdir().unwrap();
        let buffer = dir.path().join("buffer.ndjson");
        let emitter = Emitter::new(None, &buffer);

        emitter.emit(&record("https://www.zoopla.co.uk/to-rent/details/1")).await.unwrap();

        let lines = read_lines(&buffer);
        let line = &lines[0];
        assert_eq!(line["rent_pcm"], 1200);
        assert_eq!(line["beds"], 3);
        assert_eq!(line["address"], "123 Fake Street");
        assert_eq!(line["postcode"], "L12AB");
        assert_eq!(line["source"], "zoopla");
        assert!(line["scraped_at"].is_string());
    }
}

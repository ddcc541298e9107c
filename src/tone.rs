//! Client for the backend's tone-analysis endpoint.
//!
//! The backend rebuilds a trainer's tone profile from the raw samples stored
//! in the tone table. The call is fire-and-report: no body is sent and none
//! is interpreted beyond the status code.

use std::future::Future;
use std::time::Duration;

use crate::domain::types::TrainerId;

const ANALYZE_TONE_PATH: &str = "/admin/analyze_tone";

/// Error type for tone-analysis trigger failures.
#[derive(Debug, thiserror::Error)]
pub enum ToneAnalysisError {
    /// The request never produced a response (network, DNS, timeout).
    #[error("tone analysis request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status; `body` is its reply verbatim.
    #[error("tone analysis rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Anything able to ask the backend to re-analyze a trainer's tone.
pub trait ToneAnalyzer {
    fn analyze_tone(
        &self,
        trainer_id: &TrainerId,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ToneAnalysisError>>;
}

/// HTTP implementation of [`ToneAnalyzer`].
#[derive(Clone)]
pub struct ToneAnalysisClient {
    client: reqwest::Client,
    base_url: String,
}

impl ToneAnalysisClient {
    pub fn new(base_url: &str) -> Result<Self, ToneAnalysisError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{ANALYZE_TONE_PATH}", self.base_url)
    }
}

impl ToneAnalyzer for ToneAnalysisClient {
    async fn analyze_tone(
        &self,
        trainer_id: &TrainerId,
        timeout: Duration,
    ) -> Result<(), ToneAnalysisError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("trainer_id", trainer_id.as_str())])
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            log::info!("Tone analysis accepted for {trainer_id}");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ToneAnalysisError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

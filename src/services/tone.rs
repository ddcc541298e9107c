use std::time::Duration;

use crate::forms::trainer_data::TrainerFormPayload;
use crate::services::{Notice, ServiceError, ServiceResult};
use crate::tone::{ToneAnalysisError, ToneAnalyzer};

/// Manually ask the backend to rebuild a trainer's tone profile.
pub async fn trigger_tone_analysis<A>(
    payload: TrainerFormPayload,
    analyzer: &A,
    timeout: Duration,
) -> ServiceResult<Notice>
where
    A: ToneAnalyzer,
{
    match analyzer.analyze_tone(&payload.trainer_id, timeout).await {
        Ok(()) => Ok(Notice::success("Tone analysis completed.")),
        Err(ToneAnalysisError::Rejected { status, body }) => {
            log::warn!(
                "Tone analysis for {} rejected with HTTP {status}",
                payload.trainer_id
            );
            Err(ServiceError::AnalysisTrigger(body))
        }
        Err(e) => {
            log::warn!("Tone analysis for {} failed: {e}", payload.trainer_id);
            Err(ServiceError::AnalysisTrigger(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::TrainerId;

    struct StatusAnalyzer(Option<(u16, &'static str)>);

    impl ToneAnalyzer for StatusAnalyzer {
        async fn analyze_tone(
            &self,
            _trainer_id: &TrainerId,
            timeout: Duration,
        ) -> Result<(), ToneAnalysisError> {
            assert_eq!(timeout, Duration::from_secs(15));
            match self.0 {
                Some((status, body)) => Err(ToneAnalysisError::Rejected {
                    status,
                    body: body.to_string(),
                }),
                None => Ok(()),
            }
        }
    }

    fn payload() -> TrainerFormPayload {
        TrainerFormPayload {
            trainer_id: TrainerId::new("tr_001").unwrap(),
        }
    }

    #[tokio::test]
    async fn success_yields_a_notice() {
        let notice = trigger_tone_analysis(payload(), &StatusAnalyzer(None), Duration::from_secs(15))
            .await
            .unwrap();
        assert_eq!(notice, Notice::success("Tone analysis completed."));
    }

    #[tokio::test]
    async fn rejection_surfaces_backend_text_verbatim() {
        let err = trigger_tone_analysis(
            payload(),
            &StatusAnalyzer(Some((422, "no tone samples for tr_001"))),
            Duration::from_secs(15),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err,
            ServiceError::AnalysisTrigger("no tone samples for tr_001".into())
        );
    }
}

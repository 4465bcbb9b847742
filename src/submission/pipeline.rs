use uuid::Uuid;

use crate::sinks::{SinkChain, SinkError};

use super::Submission;

#[derive(Debug)]
pub struct PipelineResult {
    pub submission_id: Uuid,
    pub delivered: Vec<String>,
}

/// The first sink that failed, with the sinks that completed before it.
#[derive(Debug)]
pub struct PipelineError {
    pub submission_id: Uuid,
    pub sink: String,
    pub delivered: Vec<String>,
    pub source: SinkError,
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} sink failed: {}", self.sink, self.source)
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Deliver a submission to each sink in order, stopping at the first failure.
///
/// Completed deliveries are not rolled back.
pub async fn run(sinks: &SinkChain, submission: &Submission) -> Result<PipelineResult, PipelineError> {
    let submission_id = Uuid::now_v7();
    let mut delivered = Vec::with_capacity(sinks.len());

    tracing::info!(
        "Submission {submission_id} received ({} fields)",
        submission.len()
    );

    for sink in sinks.iter() {
        if let Err(e) = sink.deliver(submission).await {
            tracing::error!("Submission {submission_id}: {} sink failed: {e}", sink.name());
            return Err(PipelineError {
                submission_id,
                sink: sink.name().to_string(),
                delivered,
                source: e,
            });
        }

        tracing::debug!("Submission {submission_id}: delivered to {}", sink.name());
        delivered.push(sink.name().to_string());
    }

    tracing::info!("Submission {submission_id} delivered to {}", delivered.join(", "));

    Ok(PipelineResult {
        submission_id,
        delivered,
    })
}

pub mod email;
pub mod firebase;
pub mod sheets;

use std::sync::Arc;

use async_trait::async_trait;

use crate::submission::Submission;

#[derive(Debug, Clone, PartialEq)]
pub struct SinkError {
    pub message: String,
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SinkError {}

impl From<String> for SinkError {
    fn from(s: String) -> Self {
        SinkError { message: s }
    }
}

impl From<&str> for SinkError {
    fn from(s: &str) -> Self {
        SinkError {
            message: s.to_string(),
        }
    }
}

/// An external service that records or forwards a submission.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;
    async fn deliver(&self, submission: &Submission) -> Result<(), SinkError>;
}

/// Sinks in the order a submission visits them.
#[derive(Clone, Default)]
pub struct SinkChain {
    sinks: Vec<Arc<dyn Sink>>,
}

impl SinkChain {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn then(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Sink>> {
        self.sinks.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

use std::sync::Arc;

use crate::sinks::SinkChain;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub sinks: SinkChain,
}

impl AppState {
    pub fn new(sinks: SinkChain) -> SharedState {
        Arc::new(Self { sinks })
    }
}

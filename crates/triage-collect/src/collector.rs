//! Collector trait and the context collectors run in

use async_trait::async_trait;
use triage_core::MemoryEvidence;

use crate::error::Result;
use crate::progress::{CancelToken, ProgressSender};

/// Shared runtime settings for one collection run
#[derive(Debug, Clone)]
pub struct CollectContext {
    /// Items a single collector works on at once
    pub concurrency: usize,
    pub progress: ProgressSender,
    pub cancel: CancelToken,
}

impl Default for CollectContext {
    fn default() -> Self {
        Self {
            concurrency: 4,
            progress: ProgressSender::disabled(),
            cancel: CancelToken::never(),
        }
    }
}

impl CollectContext {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress(mut self, progress: ProgressSender) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// One runnable collector
#[async_trait]
pub trait Collector: Send + Sync {
    fn title(&self) -> String;

    fn is_excluded(&self) -> Result<bool>;

    /// Gather artifacts. Returned paths are relative to the bundle root.
    async fn collect(&self, ctx: &CollectContext) -> Result<MemoryEvidence>;
}

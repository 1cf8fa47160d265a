use core_types::UploadStatus;
use tokio::task::AbortHandle;

/// Transient upload indicator. A settled status is cleared by a single pending
/// timer; every transition bumps the generation so a timer armed for an older
/// state never clears a newer one. While other uploads are still in flight the
/// clear falls back to `Uploading` instead of `Idle`.
#[derive(Debug, Default)]
pub(crate) struct StatusTracker {
    current: UploadStatus,
    generation: u64,
    in_flight: usize,
    timer: Option<AbortHandle>,
}

impl StatusTracker {
    pub(crate) fn current(&self) -> UploadStatus {
        self.current
    }

    pub(crate) fn begin_upload(&mut self) -> UploadStatus {
        self.in_flight += 1;
        self.transition(UploadStatus::Uploading);
        self.current
    }

    /// Returns the generation the clear timer must present to `expire`.
    pub(crate) fn settle(&mut self, succeeded: bool) -> u64 {
        self.in_flight = self.in_flight.saturating_sub(1);
        let next = if succeeded {
            UploadStatus::Succeeded
        } else {
            UploadStatus::Failed
        };
        self.transition(next);
        self.generation
    }

    pub(crate) fn arm(&mut self, timer: AbortHandle) {
        self.cancel_timer();
        self.timer = Some(timer);
    }

    /// Returns the status shown after the clear, or `None` for a stale timer.
    pub(crate) fn expire(&mut self, generation: u64) -> Option<UploadStatus> {
        if generation != self.generation || !self.current.is_settled() {
            return None;
        }
        self.timer = None;
        self.current = if self.in_flight > 0 {
            UploadStatus::Uploading
        } else {
            UploadStatus::Idle
        };
        self.generation += 1;
        Some(self.current)
    }

    pub(crate) fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn transition(&mut self, next: UploadStatus) {
        self.cancel_timer();
        self.current = next;
        self.generation += 1;
    }
}

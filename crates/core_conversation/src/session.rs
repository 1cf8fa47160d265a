use std::sync::Arc;
use std::time::Duration;

use core_types::{
    DocumentHandle, Message, QueryResult, SessionId, StatementService, UploadError, UploadResult,
    UploadStatus,
};
use i18n::I18n;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::history::ConversationLog;
use crate::status::StatusTracker;

const EVENT_CAPACITY: usize = 64;
const DEFAULT_STATUS_CLEAR_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("message text is empty")]
    EmptyMessage,
}

#[derive(Debug, Clone)]
pub enum ConversationEvent {
    MessageAppended(Message),
    StatusChanged(UploadStatus),
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub status_clear_delay: Duration,
    pub welcome_message: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            status_clear_delay: DEFAULT_STATUS_CLEAR_DELAY,
            welcome_message: true,
        }
    }
}

impl SessionOptions {
    pub fn with_status_clear_delay(mut self, delay: Duration) -> Self {
        self.status_clear_delay = delay;
        self
    }

    pub fn with_welcome_message(mut self, enabled: bool) -> Self {
        self.welcome_message = enabled;
        self
    }
}

/// Handle to one chat screen's conversation. Clones share the same log.
///
/// Every question or upload appends exactly one bot message once the service
/// call settles. Overlapping calls are neither serialized nor deduplicated, so
/// answers land in settlement order. Dropping the last handle cancels the
/// pending status-clear timer but not in-flight requests.
#[derive(Clone)]
pub struct ChatSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    id: SessionId,
    service: Arc<dyn StatementService>,
    i18n: I18n,
    log: Mutex<ConversationLog>,
    status: Mutex<StatusTracker>,
    status_clear_delay: Duration,
    events: broadcast::Sender<ConversationEvent>,
}

impl ChatSession {
    pub fn new(service: Arc<dyn StatementService>, i18n: I18n, options: SessionOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = SessionInner {
            id: SessionId::new_v4(),
            service,
            i18n,
            log: Mutex::new(ConversationLog::new()),
            status: Mutex::new(StatusTracker::default()),
            status_clear_delay: options.status_clear_delay,
            events,
        };
        if options.welcome_message {
            inner.append(Message::bot(inner.i18n.t("chat.welcome")));
        }
        info!(session = %inner.id, "chat session opened");
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn id(&self) -> SessionId {
        self.inner.id
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.log.lock().messages().to_vec()
    }

    pub fn message_count(&self) -> usize {
        self.inner.log.lock().messages().len()
    }

    pub fn status(&self) -> UploadStatus {
        self.inner.status.lock().current()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.inner.events.subscribe()
    }

    /// Appends the user message, waits for the service and returns the bot reply.
    pub async fn send_user_message(&self, text: &str) -> Result<Message, SessionError> {
        self.inner.append_user(text)?;
        Ok(self.inner.answer(text).await)
    }

    /// Appends the user message right away and answers it on a spawned task.
    pub fn submit_user_message(&self, text: &str) -> Result<JoinHandle<Message>, SessionError> {
        self.inner.append_user(text)?;
        let inner = Arc::clone(&self.inner);
        let question = text.to_string();
        Ok(tokio::spawn(async move { inner.answer(&question).await }))
    }

    pub async fn upload_document(&self, document: DocumentHandle) -> Message {
        self.inner.begin_upload();
        self.inner.finish_upload(&document).await
    }

    pub fn submit_upload(&self, document: DocumentHandle) -> JoinHandle<Message> {
        self.inner.begin_upload();
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.finish_upload(&document).await })
    }
}

impl SessionInner {
    fn append(&self, message: Message) -> Message {
        let appended = self.log.lock().append(message).clone();
        debug!(
            session = %self.id,
            message_id = %appended.id,
            sender = ?appended.sender,
            "message appended"
        );
        self.emit(ConversationEvent::MessageAppended(appended.clone()));
        appended
    }

    fn emit(&self, event: ConversationEvent) {
        // no subscribers is not an error
        let _ = self.events.send(event);
    }

    fn append_user(&self, text: &str) -> Result<Message, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        Ok(self.append(Message::user(text)))
    }

    async fn answer(&self, question: &str) -> Message {
        let reply = match self.service.ask_question(question).await {
            QueryResult::Answered { answer_text } => answer_text,
            QueryResult::Failed { reason } => {
                debug!(session = %self.id, %reason, "answering with query fallback");
                self.i18n.t("chat.query.failed").to_string()
            }
        };
        self.append(Message::bot(reply))
    }

    fn begin_upload(&self) {
        let status = self.status.lock().begin_upload();
        self.emit(ConversationEvent::StatusChanged(status));
    }

    async fn finish_upload(self: &Arc<Self>, document: &DocumentHandle) -> Message {
        let result = self.service.upload_document(document).await;
        let (message, succeeded) = match result {
            UploadResult {
                succeeded: true,
                report_content: Some(report),
                ..
            } => (
                Message::bot_with_attachment(report, document.display_name()),
                true,
            ),
            UploadResult {
                error_detail: Some(UploadError::MissingReport),
                ..
            } => (Message::bot(self.i18n.t("chat.upload.no_report")), false),
            UploadResult { error_detail, .. } => {
                debug!(
                    session = %self.id,
                    detail = ?error_detail,
                    "answering with upload fallback"
                );
                (Message::bot(self.i18n.t("chat.upload.failed")), false)
            }
        };
        let message = self.append(message);
        self.settle_status(succeeded);
        message
    }

    fn settle_status(self: &Arc<Self>, succeeded: bool) {
        let settled = {
            let mut status = self.status.lock();
            let generation = status.settle(succeeded);
            let session = Arc::downgrade(self);
            let delay = self.status_clear_delay;
            let timer = tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(session) = session.upgrade() {
                    session.expire_status(generation);
                }
            });
            status.arm(timer.abort_handle());
            status.current()
        };
        self.emit(ConversationEvent::StatusChanged(settled));
    }

    fn expire_status(&self, generation: u64) {
        let cleared = self.status.lock().expire(generation);
        if let Some(status) = cleared {
            self.emit(ConversationEvent::StatusChanged(status));
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.status.get_mut().cancel_timer();
        debug!(session = %self.id, "chat session closed");
    }
}

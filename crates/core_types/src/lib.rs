use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub type SessionId = Uuid;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

static LAST_MESSAGE_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UiLanguage {
    ZhCn,
    #[default]
    EnUs,
}

/// Millisecond timestamp, strictly increasing within the process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn next() -> Self {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let previous = match LAST_MESSAGE_ID.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |last| Some(now.max(last + 1)),
        ) {
            Ok(previous) | Err(previous) => previous,
        };
        Self(now.max(previous + 1))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, Some(text.into()), None)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, Some(text.into()), None)
    }

    pub fn bot_with_attachment(text: impl Into<String>, attachment_path: impl Into<String>) -> Self {
        Self::new(
            Sender::Bot,
            Some(text.into()),
            Some(attachment_path.into()),
        )
    }

    fn new(sender: Sender, text: Option<String>, attachment_path: Option<String>) -> Self {
        Self {
            id: MessageId::next(),
            text,
            sender,
            attachment_path,
            created_at: Utc::now(),
        }
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("only PDF documents can be uploaded: {0}")]
    NotPdf(String),
    #[error("document path has no file name: {0}")]
    MissingFileName(String),
}

/// A locally picked file that passed the PDF filter.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct DocumentHandle {
    path: PathBuf,
    display_name: String,
}

impl DocumentHandle {
    pub fn pdf(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        let display_name = path
            .file_name()
            .and_then(OsStr::to_str)
            .map(str::to_string)
            .ok_or_else(|| DocumentError::MissingFileName(path.display().to_string()))?;

        let is_pdf = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(DocumentError::NotPdf(display_name));
        }

        Ok(Self { path, display_name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
    #[error("upload rejected with HTTP status {0}")]
    Status(u16),
    #[error("no report content received from the server")]
    MissingReport,
    #[error("upload failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub succeeded: bool,
    pub report_content: Option<String>,
    pub error_detail: Option<UploadError>,
}

impl UploadResult {
    pub fn success(report_content: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            report_content: Some(report_content.into()),
            error_detail: None,
        }
    }

    pub fn failure(error: UploadError) -> Self {
        Self {
            succeeded: false,
            report_content: None,
            error_detail: Some(error),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query rejected with HTTP status {0}")]
    Status(u16),
    #[error("response carried no string answer")]
    MissingAnswer,
    #[error("query transport failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Answered { answer_text: String },
    Failed { reason: QueryError },
}

impl QueryResult {
    pub fn answered(answer_text: impl Into<String>) -> Self {
        Self::Answered {
            answer_text: answer_text.into(),
        }
    }

    pub fn failed(reason: QueryError) -> Self {
        Self::Failed { reason }
    }

    pub fn answer_text(&self) -> Option<&str> {
        match self {
            Self::Answered { answer_text } => Some(answer_text),
            Self::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Idle,
    Uploading,
    Succeeded,
    Failed,
}

impl UploadStatus {
    /// Settled states are the ones cleared back to `Idle` by the status timer.
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// The remote categorization service. Implementations never fail outright:
/// every outcome is normalized into a result value.
#[async_trait]
pub trait StatementService: Send + Sync {
    async fn upload_document(&self, document: &DocumentHandle) -> UploadResult;
    async fn ask_question(&self, question: &str) -> QueryResult;
}

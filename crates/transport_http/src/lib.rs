use anyhow::{Context, Result};
use async_trait::async_trait;
use config::ServiceConfig;
use core_types::{
    DocumentHandle, QueryError, QueryResult, StatementService, UploadError, UploadResult,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

const UPLOAD_FIELD: &str = "file";
const JSON_MIME: &str = "application/json";
const TOKEN_HEADER: &str = "x-token";

#[derive(Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
}

pub struct HttpStatementService {
    client: reqwest::Client,
    upload_url: String,
    query_url: String,
    auth_headers: HeaderMap,
}

impl HttpStatementService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ServiceConfig) -> Result<Self> {
        config.validate().context("invalid service config")?;
        if !config.has_credentials() {
            warn!("service credentials are empty; requests will likely be rejected");
        }

        let mut auth_headers = HeaderMap::new();
        auth_headers.insert(
            HeaderName::from_static(TOKEN_HEADER),
            HeaderValue::from_str(config.api_key.trim()).context("invalid api key header")?,
        );
        auth_headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_token.trim()))
                .context("invalid authorization header")?,
        );

        Ok(Self {
            client,
            upload_url: config.upload_url.trim().to_string(),
            query_url: config.query_url.trim().to_string(),
            auth_headers,
        })
    }

    async fn try_upload(&self, document: &DocumentHandle) -> Result<String, UploadError> {
        let bytes = tokio::fs::read(document.path()).await.map_err(|err| {
            UploadError::Failed(format!(
                "failed to read {}: {err}",
                document.path().display()
            ))
        })?;
        let part = Part::bytes(bytes)
            .file_name(document.display_name().to_string())
            .mime_str(document.content_type())
            .map_err(upload_failed)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(&self.upload_url)
            .headers(self.auth_headers.clone())
            .header(ACCEPT, JSON_MIME)
            .multipart(form)
            .send()
            .await
            .map_err(upload_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(upload_failed)?;
        report_content(&body).ok_or(UploadError::MissingReport)
    }

    async fn try_ask(&self, question: &str) -> Result<String, QueryError> {
        let response = self
            .client
            .post(&self.query_url)
            .headers(self.auth_headers.clone())
            .header(ACCEPT, JSON_MIME)
            .json(&QuestionRequest { question })
            .send()
            .await
            .map_err(query_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(query_failed)?;
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            debug!(ack = message, "service acknowledgement");
        }
        body.get("response")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(QueryError::MissingAnswer)
    }
}

#[async_trait]
impl StatementService for HttpStatementService {
    async fn upload_document(&self, document: &DocumentHandle) -> UploadResult {
        match self.try_upload(document).await {
            Ok(report) => {
                info!(
                    document = document.display_name(),
                    report_len = report.len(),
                    "statement uploaded"
                );
                UploadResult::success(report)
            }
            Err(err) => {
                warn!(document = document.display_name(), error = %err, "statement upload failed");
                UploadResult::failure(err)
            }
        }
    }

    async fn ask_question(&self, question: &str) -> QueryResult {
        match self.try_ask(question).await {
            Ok(answer) => {
                info!(answer_len = answer.len(), "question answered");
                QueryResult::answered(answer)
            }
            Err(err) => {
                warn!(error = %err, "question failed");
                QueryResult::failed(err)
            }
        }
    }
}

fn upload_failed(err: reqwest::Error) -> UploadError {
    UploadError::Failed(err.to_string())
}

fn query_failed(err: reqwest::Error) -> QueryError {
    QueryError::Transport(err.to_string())
}

/// Any truthy report counts. Structured reports are rendered back to pretty
/// JSON text; null, `false`, `""` and empty containers count as missing.
fn report_content(body: &Value) -> Option<String> {
    match body.get("report_content")? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some(true.to_string()),
        Value::Object(map) if !map.is_empty() => serde_json::to_string_pretty(map).ok(),
        Value::Array(items) if !items.is_empty() => serde_json::to_string_pretty(items).ok(),
        _ => None,
    }
}

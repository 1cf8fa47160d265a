use std::sync::Arc;

use config::ServiceConfig;
use core_conversation::{ChatSession, SessionOptions};
use core_types::{DocumentHandle, Sender, UploadStatus};
use i18n::I18n;
use serde_json::json;
use transport_http::HttpStatementService;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_for(server: &MockServer) -> ChatSession {
    let config = ServiceConfig {
        api_key: "e2e-key".to_string(),
        api_token: "e2e-token".to_string(),
        upload_url: format!("{}/upload_pdf/", server.uri()),
        query_url: format!("{}/ask/", server.uri()),
    };
    let service = HttpStatementService::new(&config).expect("service");
    ChatSession::new(
        Arc::new(service),
        I18n::default(),
        SessionOptions::default().with_welcome_message(false),
    )
}

#[tokio::test]
async fn groceries_question_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask/"))
        .and(body_json(json!({"question": "How much did I spend on groceries?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Sit tight, we're working our magic!",
            "response": "You spent $240 on groceries this month."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = session_for(&server);
    session
        .send_user_message("How much did I spend on groceries?")
        .await
        .expect("send");

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(
        messages[0].text.as_deref(),
        Some("How much did I spend on groceries?")
    );
    assert_eq!(messages[1].sender, Sender::Bot);
    assert_eq!(
        messages[1].text.as_deref(),
        Some("You spent $240 on groceries this month.")
    );
}

#[tokio::test]
async fn statement_upload_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload_pdf/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "PDF processed successfully.",
            "sample_table": [],
            "report_content": "Groceries: $240\nTransportation: $95"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("statement.pdf");
    std::fs::write(&file, "%PDF-1.4\n%%EOF\n").expect("write pdf");

    let session = session_for(&server);
    let message = session
        .upload_document(DocumentHandle::pdf(&file).expect("pdf"))
        .await;

    assert_eq!(
        message.text.as_deref(),
        Some("Groceries: $240\nTransportation: $95")
    );
    assert_eq!(message.attachment_path.as_deref(), Some("statement.pdf"));
    assert_eq!(session.status(), UploadStatus::Succeeded);
}

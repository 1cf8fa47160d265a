use core_types::{Message, Sender, UploadStatus};
use i18n::I18n;

pub fn render_message(message: &Message, i18n: &I18n) -> String {
    let speaker = match message.sender {
        Sender::User => i18n.t("chat.you"),
        Sender::Bot => i18n.t("chat.bot"),
    };
    let mut lines = message.text_or_empty().lines();
    let mut out = format!("{speaker}: {}", lines.next().unwrap_or_default());
    for line in lines {
        out.push_str("\n    ");
        out.push_str(line);
    }
    if let Some(path) = &message.attachment_path {
        out.push_str(&format!("\n    [{}: {path}]", i18n.t("chat.attachment")));
    }
    out
}

pub fn render_status(status: UploadStatus, i18n: &I18n) -> Option<&str> {
    match status {
        UploadStatus::Idle => None,
        UploadStatus::Uploading => Some(i18n.t("status.uploading")),
        UploadStatus::Succeeded => Some(i18n.t("status.succeeded")),
        UploadStatus::Failed => Some(i18n.t("status.failed")),
    }
}

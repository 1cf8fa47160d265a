use anyhow::{Context, Result};
use core_conversation::{ChatSession, ConversationEvent};
use core_types::{DocumentError, DocumentHandle, Message};
use i18n::I18n;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::render::{render_message, render_status};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ask(String),
    Upload(String),
    Help,
    Quit,
    Empty,
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if let Some(rest) = trimmed.strip_prefix("/upload") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Command::Upload(rest.trim().to_string());
        }
    }
    match trimmed {
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Ask(line.to_string()),
    }
}

/// Applies the PDF filter before anything reaches the session.
pub fn start_upload(
    session: &ChatSession,
    path: &str,
) -> Result<JoinHandle<Message>, DocumentError> {
    let document = DocumentHandle::pdf(path)?;
    info!(document = document.display_name(), "uploading statement");
    Ok(session.submit_upload(document))
}

pub async fn run(session: ChatSession, i18n: I18n) -> Result<()> {
    for message in session.messages() {
        println!("{}", render_message(&message, &i18n));
    }
    println!("{}", i18n.t("chat.hint"));

    let renderer = tokio::spawn(render_events(session.subscribe(), i18n.clone()));
    let mut pending: Vec<JoinHandle<Message>> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        pending.retain(|task| !task.is_finished());
        match parse_command(&line) {
            Command::Empty => {}
            Command::Help => println!("{}", i18n.t("chat.hint")),
            Command::Quit => break,
            Command::Upload(path) => match start_upload(&session, &path) {
                Ok(task) => pending.push(task),
                Err(err) => {
                    warn!(error = %err, "document rejected by picker filter");
                    println!("{}: {path}", i18n.t("picker.rejected"));
                }
            },
            Command::Ask(text) => match session.submit_user_message(&text) {
                Ok(task) => pending.push(task),
                Err(_) => println!("{}", i18n.t("chat.empty")),
            },
        }
    }

    if !pending.is_empty() {
        info!(pending = pending.len(), "waiting for outstanding replies");
    }
    for task in pending {
        if let Err(err) = task.await {
            warn!(error = %err, "reply task did not complete");
        }
    }

    info!(session = %session.id(), "leaving chat screen");
    // the renderer drains buffered events and stops once the channel closes
    drop(session);
    if let Err(err) = renderer.await {
        warn!(error = %err, "renderer task did not complete");
    }
    Ok(())
}

async fn render_events(mut events: broadcast::Receiver<ConversationEvent>, i18n: I18n) {
    loop {
        match events.recv().await {
            Ok(ConversationEvent::MessageAppended(message)) => {
                println!("{}", render_message(&message, &i18n));
            }
            Ok(ConversationEvent::StatusChanged(status)) => {
                if let Some(label) = render_status(status, &i18n) {
                    println!("[{label}]");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer fell behind conversation events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

mod chat;
mod render;
mod screens;

use std::sync::Arc;
use std::{fs, io, path::Path};

use anyhow::{Context, Result};
use config::{AppConfig, ConfigStore};
use core_conversation::{ChatSession, SessionOptions};
use i18n::I18n;
use screens::{Screen, ScreenStack, SplashScreen};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use transport_http::HttpStatementService;

#[tokio::main]
async fn main() -> Result<()> {
    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    data_dir.push("spendwise");
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    let config_store = ConfigStore::from_default_location()
        .unwrap_or_else(|_| ConfigStore::from_dir(data_dir.join("config")));
    let config = match config_store.load_or_init() {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to load config: {err:#}");
            AppConfig::default()
        }
    };
    info!(config = %config_store.path().display(), service = ?config.service, "config loaded");

    let i18n = I18n::new(config.language);
    let service =
        HttpStatementService::new(&config.service).context("failed to build service client")?;

    let mut screens = ScreenStack::new();
    SplashScreen::new(config.chat.splash_duration())
        .run(&mut io::stdout(), &i18n, &mut screens)
        .await
        .context("failed to render splash screen")?;

    if screens.current() != Screen::Chat {
        return Ok(());
    }

    let session = ChatSession::new(
        Arc::new(service),
        i18n.clone(),
        SessionOptions::default().with_status_clear_delay(config.chat.status_clear_delay()),
    );
    chat::run(session, i18n).await
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "spendwise.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,spendwise=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}

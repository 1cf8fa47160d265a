use std::io::{self, Write};
use std::time::Duration;

use i18n::I18n;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Chat,
}

pub trait Navigator {
    fn navigate_to_main(&mut self);
}

/// Two-screen stack; navigating to main replaces the splash.
#[derive(Debug)]
pub struct ScreenStack {
    current: Screen,
}

impl Default for ScreenStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenStack {
    pub fn new() -> Self {
        Self {
            current: Screen::Splash,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }
}

impl Navigator for ScreenStack {
    fn navigate_to_main(&mut self) {
        debug!(from = ?self.current, "navigating to chat screen");
        self.current = Screen::Chat;
    }
}

pub struct SplashScreen {
    duration: Duration,
}

impl SplashScreen {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub async fn run<W, N>(&self, out: &mut W, i18n: &I18n, navigator: &mut N) -> io::Result<()>
    where
        W: Write,
        N: Navigator,
    {
        writeln!(out)?;
        writeln!(out, "  {}", i18n.t("app.title"))?;
        writeln!(out, "  {}", i18n.t("splash.tagline"))?;
        writeln!(out)?;
        out.flush()?;

        tokio::time::sleep(self.duration).await;
        navigator.navigate_to_main();
        Ok(())
    }
}

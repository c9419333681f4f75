//! # Polling Module
//!
//! Periodically fetches heart rate and theme from the server and forwards
//! them to the render owner as `OverlayUpdate` messages.
//!
//! ## Key Components
//! - `PollManager`: Owns the polling runtime and both polling tasks
//! - `ThemeWatch`: Filters out theme strings that have not changed
//!
//! ## Threading
//! Runs on its own thread with a single-threaded Tokio runtime. The render
//! state is never shared with it; updates travel over the channel and the
//! receiver applies them between frames. Polling ends when the receiving
//! side is dropped.

use crate::config::Config;
use crate::render::OverlayUpdate;
use crate::source::HttpSource;
use crate::theme::{self, ThemeConfig};
use crossbeam_channel::Sender;
use std::time::Duration;
use tokio::runtime::Builder;
use tokio::time::MissedTickBehavior;

/// Remembers the last theme string and resolves only changes
#[derive(Debug, Default)]
pub struct ThemeWatch {
    last: Option<String>,
}

impl ThemeWatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, theme: Option<String>) -> Option<ThemeConfig> {
        let theme = theme?;
        if self.last.as_deref() == Some(theme.as_str()) {
            return None;
        }
        let resolved = theme::resolve(&theme);
        self.last = Some(theme);
        Some(resolved)
    }
}

pub struct PollManager {
    config: Config,
    sender: Sender<OverlayUpdate>,
}

impl PollManager {
    pub fn new(config: Config, sender: Sender<OverlayUpdate>) -> Self {
        PollManager { config, sender }
    }

    /// Runs both polling loops until the update receiver is dropped.
    ///
    /// Blocks the calling thread; spawn it on a dedicated one.
    pub fn run(self) {
        let rt = match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(e) => {
                log::error!("Failed to create polling runtime: {}", e);
                return;
            }
        };

        log::info!("Polling {}", self.config.server_url);
        let source = HttpSource::new(&self.config.server_url);
        rt.block_on(async {
            tokio::join!(
                poll_heart_rate(&source, &self.sender, self.config.hr_poll_interval_ms),
                poll_theme(&source, &self.sender, self.config.theme_poll_interval_ms),
            );
        });
        log::info!("Polling stopped");
    }
}

fn ticker(interval_ms: u64) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn poll_heart_rate(source: &HttpSource, sender: &Sender<OverlayUpdate>, interval_ms: u64) {
    let mut interval = ticker(interval_ms);
    loop {
        interval.tick().await;
        match source.poll_heart_rate().await {
            Ok(sample) => {
                if sender.send(OverlayUpdate::HeartRate(sample)).is_err() {
                    break;
                }
            }
            Err(e) => log::debug!("Heart rate poll failed: {}", e),
        }
    }
}

async fn poll_theme(source: &HttpSource, sender: &Sender<OverlayUpdate>, interval_ms: u64) {
    let mut interval = ticker(interval_ms);
    let mut watch = ThemeWatch::new();
    loop {
        interval.tick().await;
        match source.poll_theme().await {
            Ok(theme) => {
                if let Some(resolved) = watch.observe(theme) {
                    if sender.send(OverlayUpdate::Theme(resolved)).is_err() {
                        break;
                    }
                }
            }
            Err(e) => log::debug!("Theme poll failed: {}", e),
        }
    }
}

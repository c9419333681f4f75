// Hide console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use hr_overlay::app::OverlayApp;
use hr_overlay::config::Config;
use hr_overlay::poller::PollManager;
use hr_overlay::render::OverlayUpdate;
use iced::Theme;

fn main() -> iced::Result {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}; using default settings", e);
            Config::default()
        }
    };

    // Pollers hand updates to the UI thread, which owns all render state
    let (sender, receiver) = crossbeam_channel::unbounded::<OverlayUpdate>();
    let poller = PollManager::new(config.clone(), sender);

    std::thread::spawn(move || {
        poller.run();
    });

    iced::application("Heart Rate Overlay", OverlayApp::update, OverlayApp::view)
        .subscription(OverlayApp::subscription)
        .theme(|_| Theme::Dark)
        .window_size((350.0, 150.0))
        .run_with(move || OverlayApp::new(receiver, &config))
}

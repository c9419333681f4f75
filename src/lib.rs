//! Live heart-rate overlay: a synthetic ECG trace or a smoothed BPM trend
//! graph, driven by values polled from the heart-rate server.

pub mod app;
pub mod beat;
pub mod charts;
pub mod config;
pub mod ecg;
pub mod error;
pub mod history;
pub mod poller;
pub mod render;
pub mod source;
pub mod surface;
pub mod theme;
pub mod trend;

use crate::charts::WaveformChart;
use crate::config::Config;
use crate::render::{OverlayUpdate, RenderLoop};
use crate::surface::DisplayList;
use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{column, container, text};
use iced::{Element, Length, Subscription, Task};
use plotters_iced::ChartWidget;
use std::cell::Cell;
use std::time::{Duration, Instant};

// Iced Application State
pub struct OverlayApp {
    render: RenderLoop,
    receiver: Receiver<OverlayUpdate>,
    display: DisplayList,
    // Pixel size of the chart as last drawn, read back on the next tick
    canvas_size: Cell<(u32, u32)>,
    frame_interval: Duration,
    started: Instant,
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
}

impl OverlayApp {
    pub fn new(receiver: Receiver<OverlayUpdate>, config: &Config) -> (Self, Task<Message>) {
        let mut render = RenderLoop::new(config.scroll_divisor);
        render.apply_theme(&crate::theme::resolve(&config.theme));
        render.start();

        (
            OverlayApp {
                render,
                receiver,
                display: DisplayList::default(),
                canvas_size: Cell::new((0, 0)),
                frame_interval: Duration::from_millis(config.frame_interval_ms.max(1)),
                started: Instant::now(),
            },
            Task::none(),
        )
    }

    pub fn display(&self) -> &DisplayList {
        &self.display
    }

    pub fn report_canvas_size(&self, width: u32, height: u32) {
        self.canvas_size.set((width, height));
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                // Apply everything the pollers sent since the last frame
                loop {
                    match self.receiver.try_recv() {
                        Ok(update) => {
                            if let OverlayUpdate::Theme(theme) = &update {
                                log::info!("Applying theme: {:?}", theme);
                            }
                            self.render.apply(update);
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            log::debug!("Update channel closed");
                            break;
                        }
                    }
                }

                let (width, height) = self.canvas_size.get();
                self.display.resize(width, height);
                // Hidden waveform: drop the last frame so it is not replayed later
                self.display.set_visible(self.render.state().show_waveform);

                let now_ms = self.started.elapsed().as_secs_f64() * 1000.0;
                self.render.frame(&mut self.display, now_ms);
                Task::none()
            }
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        if self.render.is_running() {
            iced::time::every(self.frame_interval).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    pub fn view(&'_ self) -> Element<'_, Message> {
        let state = self.render.state();
        let reading = if state.connected && state.bpm > 0 {
            state.bpm.to_string()
        } else {
            "--".to_string()
        };

        let mut content = column![text(reading).size(40)].spacing(4);

        if state.show_waveform {
            let chart = ChartWidget::new(WaveformChart { state: self })
                .width(Length::Fill)
                .height(Length::Fill);
            content = content.push(chart);
        }

        container(content)
            .padding(8)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

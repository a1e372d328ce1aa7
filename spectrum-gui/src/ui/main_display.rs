//! # Main Display Module
//!
//! Window layout: header with the input label and capture details, the bar
//! display, and a control row.

use iced::widget::{button, column, container, horizontal_space, row, text, Space};
use iced::{Alignment, Element, Length};

use super::bar_display::BarDisplay;
use crate::{AppDisplayData, Message};

/// Static control row: label and the message each button sends.
const CONTROLS: &[(&str, Message)] = &[
    ("Mic / Aux", Message::ToggleSource),
    ("Save Config", Message::SaveConfig),
    ("Load Config", Message::LoadConfig),
    ("Exit", Message::Exit),
];

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'static, Message> {
    let header = row![
        text("Fixed-Point Spectrum").size(28),
        horizontal_space(),
        text(data.source.label()).size(22),
    ]
    .align_y(Alignment::Center);

    let status = if data.audio_worker_active {
        match data.sample_rate {
            Some(rate) => format!(
                "{} Hz | {} samples per frame | {} frames",
                rate, data.frame_len, data.frames_shown
            ),
            None => "Starting audio...".to_string(),
        }
    } else {
        "Audio stopped".to_string()
    };

    let bars_panel = container(
        column![
            text(status).size(14),
            Space::with_height(10),
            BarDisplay::new(data.bars.clone()).view(),
        ]
        .spacing(5)
        .padding(15),
    )
    .width(Length::Fill)
    .height(Length::Fill);

    let controls = CONTROLS
        .iter()
        .fold(row![].spacing(10), |controls, (label, message)| {
            controls.push(button(text(*label)).on_press(message.clone()))
        });

    container(
        column![header, Space::with_height(20), bars_panel, controls]
            .spacing(10)
            .padding(20),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}

//! # Bar Display Widget
//!
//! Draws one vertical bar per spectrum bin with a floating peak marker.
//! The DC bin is not drawn.

use iced::widget::canvas::{self, Geometry, Path};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};
use spectrum_core::bars::{Bar, MAX_LEVEL};

const PEAK_MARKER_HEIGHT: f32 = 2.0;

pub struct BarDisplay {
    bars: Vec<Bar>,
}

impl BarDisplay {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fill),
        )
        .into()
    }
}

/// Pixel height of a level on a display `height` pixels tall.
fn scaled(level: u8, height: f32) -> f32 {
    level.min(MAX_LEVEL) as f32 / MAX_LEVEL as f32 * height
}

impl<Message> canvas::Program<Message> for BarDisplay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let visible = self.bars.get(1..).unwrap_or_default();
        if !bounds.width.is_finite() || !bounds.height.is_finite() || visible.is_empty() {
            return vec![frame.into_geometry()];
        }

        let slot = bounds.width / visible.len() as f32;
        let bar_width = (slot - 1.0).max(1.0);

        for (i, bar) in visible.iter().enumerate() {
            let x = i as f32 * slot;

            let height = scaled(bar.level, bounds.height);
            if height > 0.0 {
                let body = Path::rectangle(
                    Point::new(x, bounds.height - height),
                    Size::new(bar_width, height),
                );
                frame.fill(&body, Color::from_rgb8(0x34, 0x98, 0xDB));
            }

            if bar.peak > 0 {
                let top = bounds.height - scaled(bar.peak, bounds.height);
                let marker = Path::rectangle(
                    Point::new(x, top.min(bounds.height - PEAK_MARKER_HEIGHT)),
                    Size::new(bar_width, PEAK_MARKER_HEIGHT),
                );
                frame.fill(&marker, Color::from_rgb8(0xE7, 0x4C, 0x3C));
            }
        }

        vec![frame.into_geometry()]
    }
}

//! Status card component for the home view

use egui::{Color32, RichText, Rounding, Vec2};
use crate::dashboard::theme::ThemeColors;
use crate::shared::LastRecognition;

/// A card with a title, a headline value and a colored status line
pub struct StatusCard {
    pub title: String,
    pub value: String,
    pub status: CardStatus,
    pub caption: Option<String>,
}

/// Status types for cards
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardStatus {
    Ok,
    Idle,
    Warning,
    Error,
}

impl CardStatus {
    pub fn color(&self) -> Color32 {
        match self {
            CardStatus::Ok => ThemeColors::STATUS_OK,
            CardStatus::Idle => ThemeColors::STATUS_IDLE,
            CardStatus::Warning => ThemeColors::ACCENT_WARNING,
            CardStatus::Error => ThemeColors::STATUS_ERROR,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardStatus::Ok => "OK",
            CardStatus::Idle => "Idle",
            CardStatus::Warning => "Warning",
            CardStatus::Error => "Error",
        }
    }

    /// Card status for the last recognition outcome
    pub fn from_recognition(last: Option<LastRecognition>) -> Self {
        match last {
            Some(LastRecognition::Succeeded) => CardStatus::Ok,
            Some(LastRecognition::Cancelled) => CardStatus::Warning,
            Some(LastRecognition::Failed) => CardStatus::Error,
            None => CardStatus::Idle,
        }
    }
}

impl StatusCard {
    pub fn new(title: impl Into<String>, value: impl Into<String>, status: CardStatus) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            status,
            caption: None,
        }
    }

    /// Replace the status label with custom text
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(ThemeColors::BG_MEDIUM)
            .rounding(Rounding::same(8.0))
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.set_min_width(160.0);

                ui.horizontal(|ui| {
                    // Status indicator dot
                    let dot = ui.cursor().left_top() + Vec2::new(6.0, 10.0);
                    ui.painter().circle_filled(dot, 4.0, self.status.color());
                    ui.add_space(16.0);

                    ui.vertical(|ui| {
                        ui.label(RichText::new(&self.title).size(12.0).color(ThemeColors::TEXT_MUTED));
                        ui.add_space(4.0);
                        ui.label(
                            RichText::new(&self.value)
                                .size(18.0)
                                .color(ThemeColors::TEXT_PRIMARY)
                                .strong()
                        );
                        ui.add_space(4.0);
                        let caption = self.caption.as_deref().unwrap_or(self.status.label());
                        ui.label(RichText::new(caption).size(11.0).color(self.status.color()));
                    });
                });
            });
    }
}

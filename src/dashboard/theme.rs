//! Dashboard theme and styling
//!
//! Dark, low-contrast theme suited to long editing sessions.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};

/// Dashboard color palette
pub struct ThemeColors;

impl ThemeColors {
    // Background colors
    pub const BG_DARK: Color32 = Color32::from_rgb(20, 22, 28);
    pub const BG_MEDIUM: Color32 = Color32::from_rgb(30, 33, 41);
    pub const BG_LIGHT: Color32 = Color32::from_rgb(41, 45, 55);
    pub const BG_HOVER: Color32 = Color32::from_rgb(52, 57, 69);

    // Accent colors
    pub const ACCENT_PRIMARY: Color32 = Color32::from_rgb(76, 154, 242);
    pub const ACCENT_SUCCESS: Color32 = Color32::from_rgb(64, 190, 120);
    pub const ACCENT_WARNING: Color32 = Color32::from_rgb(240, 180, 40);
    pub const ACCENT_ERROR: Color32 = Color32::from_rgb(226, 82, 70);

    // Text colors
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(236, 238, 243);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(162, 168, 182);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(104, 110, 124);

    pub const BORDER: Color32 = Color32::from_rgb(54, 59, 72);

    // Status colors
    pub const STATUS_OK: Color32 = Color32::from_rgb(64, 190, 120);
    pub const STATUS_IDLE: Color32 = Color32::from_rgb(162, 168, 182);
    pub const STATUS_ERROR: Color32 = Color32::from_rgb(226, 82, 70);
}

/// Apply the dashboard theme to egui
pub fn apply_theme(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let mut visuals = Visuals::dark();

    // Window and panel backgrounds
    visuals.window_fill = ThemeColors::BG_MEDIUM;
    visuals.panel_fill = ThemeColors::BG_DARK;
    visuals.faint_bg_color = ThemeColors::BG_LIGHT;
    visuals.extreme_bg_color = ThemeColors::BG_DARK;

    // Widget colors
    visuals.widgets.noninteractive.bg_fill = ThemeColors::BG_MEDIUM;
    visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_SECONDARY);
    visuals.widgets.noninteractive.rounding = Rounding::same(6.0);

    visuals.widgets.inactive.bg_fill = ThemeColors::BG_LIGHT;
    visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    visuals.widgets.inactive.rounding = Rounding::same(6.0);

    visuals.widgets.hovered.bg_fill = ThemeColors::BG_HOVER;
    visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    visuals.widgets.hovered.rounding = Rounding::same(6.0);

    visuals.widgets.active.bg_fill = ThemeColors::ACCENT_PRIMARY;
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, ThemeColors::TEXT_PRIMARY);
    visuals.widgets.active.rounding = Rounding::same(6.0);

    visuals.selection.bg_fill = color_with_alpha(ThemeColors::ACCENT_PRIMARY, 77);
    visuals.selection.stroke = Stroke::new(1.0, ThemeColors::ACCENT_PRIMARY);
    visuals.hyperlink_color = ThemeColors::ACCENT_PRIMARY;

    // The OCR modal is an egui::Window
    visuals.window_rounding = Rounding::same(8.0);
    visuals.window_shadow.blur = 12.0;
    visuals.window_stroke = Stroke::new(1.0, ThemeColors::BORDER);
    visuals.popup_shadow.blur = 4.0;
    visuals.menu_rounding = Rounding::same(6.0);

    style.visuals = visuals;

    // Spacing
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);
    style.spacing.window_margin = egui::Margin::same(16.0);

    style.text_styles = [
        (TextStyle::Small, FontId::new(12.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(14.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(15.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(21.0, FontFamily::Proportional)),
    ]
    .into();

    ctx.set_style(style);
}

/// Helper to create a color with modified alpha
pub fn color_with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

/// Framed section used by the builder and settings views
pub fn section_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(ThemeColors::BG_MEDIUM)
        .rounding(Rounding::same(8.0))
        .inner_margin(16.0)
}

/// Tinted banner for error and notice lines
pub fn banner(ui: &mut egui::Ui, color: Color32, label: &str, message: &str) {
    egui::Frame::none()
        .fill(color_with_alpha(color, 51))
        .rounding(Rounding::same(6.0))
        .inner_margin(10.0)
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(label).color(color).strong());
                ui.label(egui::RichText::new(message).color(ThemeColors::TEXT_PRIMARY));
            });
        });
}

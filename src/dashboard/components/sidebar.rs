//! Sidebar navigation component
//!
//! Besides switching views, the sidebar keeps the open capture visible: the
//! Builder entry carries a badge while the OCR modal is bound to a field, so
//! the user can find their way back to it from Home or Settings.

use egui::{Color32, RichText, Rounding, Sense, Vec2};
use crate::dashboard::state::DashboardView;
use crate::dashboard::theme::{ThemeColors, color_with_alpha};

/// What the sidebar reports about the rest of the app
#[derive(Debug, Clone, Default)]
pub struct SidebarStatus {
    /// Name of the active OCR engine
    pub engine_name: String,
    /// Number of tests in the assessment
    pub test_count: usize,
    /// Target of the open capture, if any
    pub capture: Option<String>,
}

/// Small marker painted at the right edge of a nav entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavBadge {
    Count(usize),
    Capturing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    pub view: DashboardView,
    pub badge: Option<NavBadge>,
    pub hover: Option<String>,
}

/// Entries shown for the given status, in display order
pub fn nav_items(status: &SidebarStatus) -> Vec<NavItem> {
    DashboardView::ALL
        .into_iter()
        .map(|view| {
            let (badge, hover) = match view {
                DashboardView::Home if status.test_count > 0 => (
                    Some(NavBadge::Count(status.test_count)),
                    Some(format!("{} tests", status.test_count)),
                ),
                DashboardView::Builder => match &status.capture {
                    Some(target) => (Some(NavBadge::Capturing), Some(format!("Capturing {}", target))),
                    None => (None, None),
                },
                _ => (None, None),
            };
            NavItem { view, badge, hover }
        })
        .collect()
}

/// Render the sidebar navigation
pub fn render_sidebar(ui: &mut egui::Ui, current_view: &mut DashboardView, status: &SidebarStatus) {
    ui.vertical(|ui| {
        ui.add_space(16.0);

        ui.horizontal(|ui| {
            ui.add_space(12.0);
            ui.label(RichText::new("QF").size(24.0).color(ThemeColors::ACCENT_PRIMARY).strong());
            ui.label(RichText::new("QuizForge").size(11.0).color(ThemeColors::TEXT_MUTED));
        });

        ui.add_space(16.0);
        ui.separator();
        ui.add_space(12.0);

        for item in nav_items(status) {
            let response = nav_entry(ui, &item, *current_view == item.view);
            let response = match &item.hover {
                Some(hover) => response.on_hover_text(hover),
                None => response,
            };
            if response.clicked() {
                *current_view = item.view;
            }
            ui.add_space(4.0);
        }

        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            ui.add_space(12.0);
            footer_line(ui, concat!("v", env!("CARGO_PKG_VERSION")), ThemeColors::TEXT_MUTED);
            footer_line(ui, &format!("OCR: {}", status.engine_name), ThemeColors::TEXT_MUTED);
            if let Some(target) = &status.capture {
                footer_line(ui, &format!("Capturing {}", target), ThemeColors::ACCENT_WARNING);
            }
            ui.add_space(8.0);
            ui.separator();
        });
    });
}

fn footer_line(ui: &mut egui::Ui, text: &str, color: Color32) {
    ui.horizontal(|ui| {
        ui.add_space(12.0);
        ui.label(RichText::new(text).size(10.0).color(color));
    });
}

/// Paint one nav entry with its badge
fn nav_entry(ui: &mut egui::Ui, item: &NavItem, is_selected: bool) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(Vec2::new(ui.available_width() - 16.0, 34.0), Sense::click());
    if !ui.is_rect_visible(rect) {
        return response;
    }

    let painter = ui.painter();
    let row = rect.shrink2(Vec2::new(8.0, 0.0));
    let (fill, text_color) = match (is_selected, response.hovered()) {
        (true, _) => (color_with_alpha(ThemeColors::ACCENT_PRIMARY, 51), ThemeColors::ACCENT_PRIMARY),
        (false, true) => (ThemeColors::BG_HOVER, ThemeColors::TEXT_PRIMARY),
        (false, false) => (Color32::TRANSPARENT, ThemeColors::TEXT_SECONDARY),
    };
    painter.rect_filled(row, Rounding::same(6.0), fill);

    painter.text(
        row.left_center() + Vec2::new(12.0, 0.0),
        egui::Align2::LEFT_CENTER,
        format!("{}  {}", item.view.icon(), item.view.name()),
        egui::FontId::proportional(14.0),
        text_color,
    );

    let badge_anchor = row.right_center() - Vec2::new(12.0, 0.0);
    match &item.badge {
        Some(NavBadge::Count(count)) => {
            painter.text(
                badge_anchor,
                egui::Align2::RIGHT_CENTER,
                count.to_string(),
                egui::FontId::proportional(11.0),
                ThemeColors::TEXT_MUTED,
            );
        }
        Some(NavBadge::Capturing) => {
            painter.circle_filled(badge_anchor - Vec2::new(4.0, 0.0), 4.0, ThemeColors::ACCENT_WARNING);
        }
        None => {}
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(items: &[NavItem], view: DashboardView) -> Option<NavBadge> {
        items.iter().find(|i| i.view == view).and_then(|i| i.badge.clone())
    }

    #[test]
    fn test_builder_badge_follows_open_capture() {
        let mut status = SidebarStatus {
            engine_name: "demo".to_string(),
            test_count: 2,
            capture: None,
        };
        let idle = nav_items(&status);
        assert_eq!(idle.len(), DashboardView::ALL.len());
        assert_eq!(badge(&idle, DashboardView::Builder), None);
        assert_eq!(badge(&idle, DashboardView::Home), Some(NavBadge::Count(2)));

        status.capture = Some("pair 2 (left item) of q-bio-2".to_string());
        let capturing = nav_items(&status);
        let builder = capturing.iter().find(|i| i.view == DashboardView::Builder).unwrap();
        assert_eq!(builder.badge, Some(NavBadge::Capturing));
        assert!(builder.hover.as_deref().unwrap().contains("pair 2 (left item)"));
        assert_eq!(badge(&capturing, DashboardView::Settings), None);
    }

    #[test]
    fn test_no_count_without_tests() {
        let items = nav_items(&SidebarStatus::default());
        assert!(items.iter().all(|i| i.badge.is_none()));
    }
}

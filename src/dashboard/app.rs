//! Dashboard application entry point

use eframe::egui;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::app::{Workbench, WorkbenchError};
use crate::capture::CapturePhase;
use crate::config;
use crate::dashboard::components::{render_sidebar, SidebarStatus};
use crate::dashboard::state::{DashboardState, DashboardView, ModalAction};
use crate::dashboard::theme;
use crate::dashboard::views::{
    render_builder_view, render_home_view, render_ocr_modal, render_settings_view,
};
use crate::shared::SharedAppState;

/// How often to repaint while a job is running, in case a wakeup is missed
const RECOGNITION_REPAINT: Duration = Duration::from_millis(100);

/// The main dashboard application
pub struct DashboardApp {
    /// Shared application state
    shared_state: Arc<RwLock<SharedAppState>>,
    /// Dashboard-specific state
    dashboard_state: DashboardState,
    /// Whether theme has been applied
    theme_applied: bool,
    /// Capture coordinator
    workbench: Workbench,
}

impl DashboardApp {
    /// Create a new dashboard application
    pub fn new(shared_state: Arc<RwLock<SharedAppState>>, ctx: &egui::Context) -> anyhow::Result<Self> {
        let start_view = shared_state.read().config.general.start_view;
        let mut workbench = Workbench::new(shared_state.clone())?;

        let repaint_ctx = ctx.clone();
        workbench.set_repaint_notifier(Arc::new(move || repaint_ctx.request_repaint()));

        Ok(Self {
            shared_state,
            dashboard_state: DashboardState::new(start_view),
            theme_applied: false,
            workbench,
        })
    }

    /// Create eframe options for the dashboard window
    pub fn options() -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1100.0, 720.0])
                .with_min_inner_size([800.0, 500.0])
                .with_drag_and_drop(true)
                .with_title("QuizForge"),
            ..Default::default()
        }
    }

    /// Open the modal requested by a builder OCR button
    fn process_capture_requests(&mut self) {
        if let Some(target) = self.dashboard_state.builder.pending_capture.take() {
            self.dashboard_state.capture.reset();
            self.workbench.open_capture(target);
        }
        if let Some(test_id) = self.dashboard_state.home.open_test.take() {
            self.dashboard_state.builder.selected_test = Some(test_id);
            self.dashboard_state.current_view = DashboardView::Builder;
        }
    }

    /// Turn files dropped on the window into modal actions
    fn collect_dropped_files(&self, ctx: &egui::Context) -> Vec<ModalAction> {
        if self.workbench.capture().is_none() {
            return Vec::new();
        }
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());

        // Only the first file is used
        dropped
            .into_iter()
            .take(1)
            .filter_map(|file| {
                if let Some(bytes) = file.bytes {
                    Some(ModalAction::SubmitBytes {
                        name: file.name,
                        bytes,
                    })
                } else {
                    file.path.map(|path| ModalAction::SubmitPath(path.display().to_string()))
                }
            })
            .collect()
    }

    fn apply_modal_action(&mut self, action: ModalAction) {
        let result = match action {
            ModalAction::Close => {
                self.workbench.close_capture();
                self.dashboard_state.capture.reset();
                Ok(())
            }
            ModalAction::SubmitPath(path) => self.workbench.submit_image_path(Path::new(&path)),
            ModalAction::SubmitBytes { name, bytes } => self.workbench.submit_image_bytes(&name, bytes),
            ModalAction::Discard => {
                self.workbench.discard_image();
                Ok(())
            }
            ModalAction::Retry => self.workbench.retry_recognition(),
            ModalAction::Commit(mode) => self.workbench.commit(mode),
        };

        match result {
            Ok(()) => {
                self.dashboard_state.capture.notice = None;
                if self.workbench.capture().is_none() {
                    self.dashboard_state.capture.reset();
                }
            }
            // Shown in the modal, session state unchanged
            Err(WorkbenchError::Acquisition(e)) => {
                warn!("Image rejected: {}", e);
                self.dashboard_state.capture.notice = Some(e.to_string());
            }
            // Already recorded on the session by the workbench
            Err(WorkbenchError::Insertion(_)) => {}
            Err(e) => {
                warn!("Capture action failed: {}", e);
                self.dashboard_state.capture.notice = Some(e.to_string());
            }
        }
    }

    /// Save settings and rebuild the engine after the settings view changed them
    fn process_settings_changes(&mut self) {
        let settings = &mut self.dashboard_state.settings;
        if settings.engine_dirty {
            settings.engine_dirty = false;
            self.workbench.reload_engine();
        }
        if !settings.has_unsaved_changes {
            return;
        }
        settings.has_unsaved_changes = false;

        let state = self.shared_state.read();
        let Some(path) = state.config_path.clone() else {
            return;
        };
        let config = state.config.clone();
        drop(state);

        match config::save_config(&config, &path) {
            Ok(()) => info!("Saved configuration to {:?}", path),
            Err(e) => {
                error!("Failed to save configuration: {:#}", e);
                self.shared_state.write().runtime.set_error(format!("Failed to save settings: {}", e));
            }
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        self.workbench.pump_events();
        self.process_capture_requests();
        self.process_settings_changes();

        if self.workbench.capture().map(|s| s.phase()) == Some(CapturePhase::Recognizing) {
            ctx.request_repaint_after(RECOGNITION_REPAINT);
        }

        let engine_name = self.workbench.engine_name().to_string();
        let sidebar_status = SidebarStatus {
            engine_name: engine_name.clone(),
            test_count: self.shared_state.read().assessment.tests().len(),
            capture: self.workbench.capture().map(|s| s.target().to_string()),
        };

        // Sidebar panel
        egui::SidePanel::left("sidebar")
            .resizable(false)
            .default_width(180.0)
            .show(ctx, |ui| {
                render_sidebar(ui, &mut self.dashboard_state.current_view, &sidebar_status);
            });

        // Main content panel
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(24.0)
                .show(ui, |ui| {
                    match self.dashboard_state.current_view {
                        DashboardView::Home => {
                            render_home_view(
                                ui,
                                &mut self.dashboard_state.home,
                                &self.shared_state,
                                &engine_name,
                            );
                        }
                        DashboardView::Builder => {
                            render_builder_view(
                                ui,
                                &mut self.dashboard_state.builder,
                                &self.shared_state,
                            );
                        }
                        DashboardView::Settings => {
                            render_settings_view(
                                ui,
                                &mut self.dashboard_state.settings,
                                &self.shared_state,
                            );
                        }
                    }
                });
        });

        // OCR modal on top of everything
        let mut actions = self.collect_dropped_files(ctx);
        if let Some(session) = self.workbench.capture_mut() {
            actions.extend(render_ocr_modal(ctx, &mut self.dashboard_state.capture, session));
        }
        for action in actions {
            self.apply_modal_action(action);
        }
    }
}

/// Run the dashboard application
pub fn run_dashboard(shared_state: Arc<RwLock<SharedAppState>>) -> Result<(), eframe::Error> {
    eframe::run_native(
        "QuizForge",
        DashboardApp::options(),
        Box::new(
            move |cc: &eframe::CreationContext<'_>| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
                let app = DashboardApp::new(shared_state, &cc.egui_ctx)?;
                Ok(Box::new(app))
            },
        ),
    )
}

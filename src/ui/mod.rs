//! User interface for the network diagram editor.
//!
//! # Module Organization
//!
//! - `state` - The [`DiagramApp`] struct and file dialog plumbing
//! - `file_ops` - Open/save dialogs, export and print actions
//! - `canvas` - The egui drawing surface and pointer routing

mod canvas;
mod file_ops;
mod state;

pub use canvas::EguiSurface;
pub use state::{DiagramApp, FileOperationResult, PendingFileOperation};

use crate::interaction::InteractionMode;
use crate::samples::{all_samples, build_sample};
use eframe::egui;
use state::{SESSION_KEY, SETTINGS_KEY};

impl eframe::App for DiagramApp {
    /// Persist settings and session between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.engine.settings().to_json() {
            Ok(json) => storage.set_string(SETTINGS_KEY, json),
            Err(err) => log::error!("Failed to serialize settings: {err}"),
        }
        match self.session.to_json() {
            Ok(json) => storage.set_string(SESSION_KEY, json),
            Err(err) => log::error!("Failed to serialize session: {err}"),
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context
    /// * `_frame` - The eframe frame
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_pending_operations(ctx);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.draw_canvas(ui);
            });
    }
}

impl DiagramApp {
    /// Routes key presses: file shortcuts here, everything else to the engine.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for checking input
    pub fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let keys: Vec<(egui::Key, egui::Modifiers)> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|e| match e {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => Some((*key, *modifiers)),
                    _ => None,
                })
                .collect()
        });

        for (key, modifiers) in keys {
            let pending = match key {
                egui::Key::S if modifiers.command && modifiers.shift => {
                    Some(PendingFileOperation::SaveAs)
                }
                egui::Key::S if modifiers.command => Some(PendingFileOperation::Save),
                egui::Key::O if modifiers.command => Some(PendingFileOperation::Open),
                egui::Key::E if modifiers.command => Some(PendingFileOperation::Export),
                egui::Key::P if modifiers.command => Some(PendingFileOperation::Print),
                _ => None,
            };
            match pending {
                Some(op) => self.file.pending = Some(op),
                None => {
                    self.engine.key_pressed(key, modifiers);
                }
            }
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Open").clicked() {
                self.file.pending = Some(PendingFileOperation::Open);
            }
            if ui.button("Save").clicked() {
                self.file.pending = Some(PendingFileOperation::Save);
            }
            if ui.button("Save As").clicked() {
                self.file.pending = Some(PendingFileOperation::SaveAs);
            }
            ui.menu_button("Samples", |ui| {
                for info in all_samples() {
                    if ui.button(info.name).clicked() {
                        if let Err(e) = self.open_network(build_sample(info.kind), None) {
                            self.report_error("Open sample", e);
                        }
                        ui.close();
                    }
                }
            });

            ui.separator();

            ui.add_enabled_ui(self.engine.can_undo(), |ui| {
                if ui.button("⟲ Undo").clicked() {
                    self.engine.undo();
                }
            });
            ui.add_enabled_ui(self.engine.can_redo(), |ui| {
                if ui.button("⟳ Redo").clicked() {
                    self.engine.redo();
                }
            });

            ui.separator();

            if ui.button("−").on_hover_text("Zoom out").clicked() {
                self.engine.zoom_out();
            }
            if ui.button("+").on_hover_text("Zoom in").clicked() {
                self.engine.zoom_in();
            }
            if ui.button("100%").on_hover_text("Actual printed size").clicked() {
                self.engine.zoom_to_actual_size();
            }
            if ui.button("Fit").clicked() {
                self.engine.zoom_to_fit();
            }

            ui.separator();

            let mut mode = self.engine.settings().mode;
            egui::ComboBox::from_id_salt("interaction_mode")
                .selected_text(match mode {
                    InteractionMode::Select => "Select",
                    InteractionMode::Pan => "Pan",
                })
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut mode, InteractionMode::Select, "Select");
                    ui.selectable_value(&mut mode, InteractionMode::Pan, "Pan");
                });
            if mode != self.engine.settings().mode {
                self.engine.settings_mut().mode = mode;
            }

            self.draw_layout_combo(ui);

            ui.separator();

            let mut settings = self.engine.settings().clone();
            ui.checkbox(&mut settings.snap_to_grid, "Snap");
            ui.checkbox(&mut settings.show_grid, "Grid");
            ui.checkbox(&mut settings.show_margins, "Margins");
            ui.checkbox(&mut settings.show_medium, "Paper");
            if &settings != self.engine.settings() {
                *self.engine.settings_mut() = settings;
            }

            ui.separator();

            if ui.button("Export…").clicked() {
                self.file.pending = Some(PendingFileOperation::Export);
            }
            egui::ComboBox::from_id_salt("print_layout")
                .selected_text(format!("Print: {}", self.print_layout))
                .show_ui(ui, |ui| {
                    for name in self.engine.layout_names() {
                        ui.selectable_value(&mut self.print_layout, name.clone(), name);
                    }
                });
            if ui.button("Print…").clicked() {
                self.file.pending = Some(PendingFileOperation::Print);
            }
        });
    }

    fn draw_layout_combo(&mut self, ui: &mut egui::Ui) {
        let current = self.engine.layout().name.clone();
        let mut chosen = current.clone();
        egui::ComboBox::from_id_salt("page_layout")
            .selected_text(format!("Layout: {current}"))
            .show_ui(ui, |ui| {
                for name in self.engine.layout_names() {
                    ui.selectable_value(&mut chosen, name.clone(), name);
                }
            });
        if chosen != current {
            if let Err(e) = self.engine.set_layout(&chosen) {
                self.report_error("Layout", e);
            }
        }
    }

    fn draw_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.title());
            ui.separator();
            ui.label(format!("Zoom: {:.0}%", self.engine.zoom_percent()));
            ui.separator();
            ui.label(format!("Nodes: {}", self.engine.model().order().len()));
            if let Some(status) = &self.status {
                ui.separator();
                ui.label(status);
            }
        });
    }
}

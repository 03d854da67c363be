//! File dialogs and the actions that follow them.
//!
//! Dialogs run on the tokio runtime and report back over the channel in
//! [`FileState`](super::state::FileState). Everything that touches the engine
//! (loading, exporting, printing) happens on the UI thread when the result
//! arrives.

use super::state::{DiagramApp, FileOperationResult, PendingFileOperation};
use crate::export::{export_image, ImageFormat};
use crate::network::StreamNetwork;
use crate::print::{PngFileSink, PrintJob};
use eframe::egui;
use std::path::{Path, PathBuf};

impl DiagramApp {
    /// Processes finished dialogs, then starts the pending one, if any.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context, used for repaints and text metrics
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.receiver.try_recv() {
            self.apply_file_result(result, ctx);
        }

        let Some(op) = self.file.pending.take() else {
            return;
        };
        let sender = self.file.sender.clone();
        let ctx = ctx.clone();
        let directory = self.session.last_directory.clone();

        match op {
            PendingFileOperation::Open => {
                tokio::spawn(async move {
                    let mut dialog = rfd::AsyncFileDialog::new().add_filter("Network", &["json"]);
                    if let Some(dir) = directory {
                        dialog = dialog.set_directory(dir);
                    }
                    if let Some(handle) = dialog.pick_file().await {
                        let path = handle.path().to_path_buf();
                        let result = match std::fs::read_to_string(&path) {
                            Ok(json) => FileOperationResult::Loaded(path, json),
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to read {}: {e}",
                                path.display()
                            )),
                        };
                        let _ = sender.send(result);
                    }
                    ctx.request_repaint();
                });
            }
            PendingFileOperation::Save | PendingFileOperation::SaveAs => {
                let json = match self.engine.model().network().save_json() {
                    Ok(json) => json,
                    Err(e) => {
                        self.report_error("Save", e);
                        return;
                    }
                };
                let current = self.session.current_file.clone();
                let suggested = self.session.suggested_name("json");
                let ask = op == PendingFileOperation::SaveAs || current.is_none();
                tokio::spawn(async move {
                    let path = match current.filter(|_| !ask) {
                        Some(path) => Some(path),
                        None => {
                            let mut dialog = rfd::AsyncFileDialog::new()
                                .add_filter("Network", &["json"])
                                .set_file_name(suggested);
                            if let Some(dir) = directory {
                                dialog = dialog.set_directory(dir);
                            }
                            dialog.save_file().await.map(|h| h.path().to_path_buf())
                        }
                    };
                    if let Some(path) = path {
                        let result = match std::fs::write(&path, json) {
                            Ok(()) => FileOperationResult::Saved(path),
                            Err(e) => FileOperationResult::OperationFailed(format!(
                                "Failed to save {}: {e}",
                                path.display()
                            )),
                        };
                        let _ = sender.send(result);
                    }
                    ctx.request_repaint();
                });
            }
            PendingFileOperation::Export => {
                let suggested = self.session.suggested_name(ImageFormat::Png.extension());
                tokio::spawn(async move {
                    let mut dialog = rfd::AsyncFileDialog::new()
                        .add_filter("PNG image", &["png"])
                        .add_filter("JPEG image", &["jpg", "jpeg"])
                        .add_filter("SVG document", &["svg"])
                        .set_file_name(suggested);
                    if let Some(dir) = directory {
                        dialog = dialog.set_directory(dir);
                    }
                    if let Some(handle) = dialog.save_file().await {
                        let _ = sender.send(FileOperationResult::ExportTo(handle.path().to_path_buf()));
                    }
                    ctx.request_repaint();
                });
            }
            PendingFileOperation::Print => {
                let suggested = self.session.suggested_name("print.png");
                tokio::spawn(async move {
                    let mut dialog = rfd::AsyncFileDialog::new()
                        .add_filter("PNG image", &["png"])
                        .set_file_name(suggested);
                    if let Some(dir) = directory {
                        dialog = dialog.set_directory(dir);
                    }
                    if let Some(handle) = dialog.save_file().await {
                        let _ = sender.send(FileOperationResult::PrintTo(handle.path().to_path_buf()));
                    }
                    ctx.request_repaint();
                });
            }
        }
    }

    /// Applies one dialog result on the UI thread.
    pub fn apply_file_result(&mut self, result: FileOperationResult, ctx: &egui::Context) {
        match result {
            FileOperationResult::Loaded(path, json) => self.load_from_json(&json, path),
            FileOperationResult::Saved(path) => {
                self.engine.mark_saved();
                self.set_status(format!("Saved {}", path.display()));
                self.session.open_file(&path);
            }
            FileOperationResult::ExportTo(path) => self.export_to(&path, ctx),
            FileOperationResult::PrintTo(path) => self.print_to(path, ctx),
            FileOperationResult::OperationFailed(message) => {
                log::error!("{message}");
                self.set_status(message);
            }
        }
    }

    /// Parses `json` and replaces the diagram with it.
    pub fn load_from_json(&mut self, json: &str, path: PathBuf) {
        let opened = StreamNetwork::from_json(json).and_then(|net| self.open_network(net, Some(path)));
        if let Err(e) = opened {
            self.report_error("Open", e);
        }
    }

    /// Exports the whole document to `path`.
    pub fn export_to(&mut self, path: &Path, ctx: &egui::Context) {
        self.session.remember_directory(path);
        match export_image(&self.engine, path, ctx) {
            Ok(()) => self.set_status(format!("Exported {}", path.display())),
            Err(e) => self.report_error("Export", e),
        }
    }

    /// Prints one page on the selected layout into a PNG file.
    pub fn print_to(&mut self, path: PathBuf, ctx: &egui::Context) {
        self.session.remember_directory(&path);
        let mut sink = PngFileSink::new(path);
        let printed = PrintJob::new(&self.engine, &self.print_layout)
            .and_then(|mut job| job.run(&mut sink, ctx));
        match printed {
            Ok(()) => self.set_status(format!("Printed to {}", sink.path().display())),
            Err(e) => self.report_error("Print", e),
        }
    }
}

//! Application state structures.
//!
//! The diagram itself lives in the [`DiagramEngine`]; this module holds what
//! surrounds it: the editing session, pending file dialogs and the status line.

use crate::engine::DiagramEngine;
use crate::error::Result;
use crate::network::StreamNetwork;
use crate::settings::{EngineSettings, Session};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};

/// Storage key of the persisted engine settings.
pub const SETTINGS_KEY: &str = "engine_settings";
/// Storage key of the persisted session.
pub const SESSION_KEY: &str = "session";

/// A file dialog the next frame should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingFileOperation {
    /// Pick a network file to open
    Open,
    /// Save to the current file, or ask for one
    Save,
    /// Ask for a new file and save to it
    SaveAs,
    /// Ask for an image path and export to it
    Export,
    /// Ask for a PNG path and print to it
    Print,
}

/// Messages sent from async file dialogs back to the app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// A network file was read
    Loaded(PathBuf, String),
    /// The network was written
    Saved(PathBuf),
    /// The user chose where to export the image
    ExportTo(PathBuf),
    /// The user chose where to write the printed page
    PrintTo(PathBuf),
    /// A dialog or I/O step failed
    OperationFailed(String),
}

/// Pending dialogs and the channel their results arrive on.
pub struct FileState {
    /// Dialog to open on the next frame
    pub pending: Option<PendingFileOperation>,
    /// Cloned into each spawned dialog task
    pub sender: Sender<FileOperationResult>,
    /// Drained once per frame
    pub receiver: Receiver<FileOperationResult>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            pending: None,
            sender,
            receiver,
        }
    }
}

/// The application: an interactive engine plus the session around it.
///
/// This struct implements [`eframe::App`]; settings and session are persisted
/// between runs through the eframe storage.
pub struct DiagramApp {
    /// The interactive diagram
    pub engine: DiagramEngine,
    /// Current editing session
    pub session: Session,
    /// Async dialog plumbing
    pub file: FileState,
    /// Page layout used by the Print action
    pub print_layout: String,
    /// Last message shown in the status bar
    pub status: Option<String>,
}

impl DiagramApp {
    /// Creates the app over `network`.
    ///
    /// # Errors
    ///
    /// [`crate::DiagramError::LayoutNotFound`] if the network defines no page
    /// layouts.
    pub fn new(network: StreamNetwork, settings: EngineSettings, session: Session) -> Result<Self> {
        let engine = DiagramEngine::new(Box::new(network), settings)?;
        let print_layout = engine.layout().name.clone();
        Ok(Self {
            engine,
            session,
            file: FileState::default(),
            print_layout,
            status: None,
        })
    }

    /// Restores settings and session from eframe storage, falling back to
    /// defaults for anything missing or unreadable.
    pub fn restore(storage: Option<&dyn eframe::Storage>) -> (EngineSettings, Session) {
        let read = |key: &str| storage.and_then(|s| s.get_string(key));
        let settings = read(SETTINGS_KEY)
            .and_then(|json| {
                EngineSettings::from_json(&json)
                    .map_err(|e| log::warn!("ignoring stored settings: {e}"))
                    .ok()
            })
            .unwrap_or_default();
        let session = read(SESSION_KEY)
            .and_then(|json| {
                Session::from_json(&json)
                    .map_err(|e| log::warn!("ignoring stored session: {e}"))
                    .ok()
            })
            .unwrap_or_default();
        (settings, session)
    }

    /// Replaces the diagram with `network` loaded from `path`.
    pub fn open_network(&mut self, network: StreamNetwork, path: Option<PathBuf>) -> Result<()> {
        self.engine.replace_network(Box::new(network))?;
        self.print_layout = self.engine.layout().name.clone();
        match path {
            Some(path) => {
                self.set_status(format!("Opened {}", path.display()));
                self.session.open_file(&path);
            }
            None => self.session.current_file = None,
        }
        Ok(())
    }

    /// Shows `message` in the status bar.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Logs a failed action and shows it in the status bar.
    pub fn report_error(&mut self, action: &str, error: impl std::fmt::Display) {
        log::error!("{action} failed: {error}");
        self.set_status(format!("{action} failed: {error}"));
    }

    /// Title shown for the current file, with a marker for unsaved edits.
    pub fn title(&self) -> String {
        let name = self
            .session
            .current_file
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());
        if self.engine.is_dirty() {
            format!("{name}*")
        } else {
            name
        }
    }
}

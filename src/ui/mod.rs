//! Control panel window
//!
//! Hosts the coordinator in an eframe window: device selector, refresh
//! action, MIDI channel selector and the generated control grid.

mod app;
mod drawing;
mod rendering;

pub use app::ControllerApp;

use crate::coordinator::Coordinator;
use crate::transport::MidirBackend;

/// Window title
pub const TITLE: &str = "UAFX MIDI Controller";

/// Open the panel window. Blocks until the window is closed.
pub fn run_panel(coordinator: Coordinator<MidirBackend>) -> anyhow::Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(TITLE)
            .with_inner_size([640.0, 320.0])
            .with_min_inner_size([420.0, 220.0]),
        ..Default::default()
    };

    eframe::run_native(
        TITLE,
        native_options,
        Box::new(move |_cc| Ok(Box::new(ControllerApp::new(coordinator)))),
    )
    .map_err(|e| anyhow::anyhow!("Control panel window failed: {}", e))
}

//! Main application struct for the control panel window.
//!
//! [`ControllerApp`] implements `eframe::App`. Each frame it draws the top bar
//! and the control grid from the coordinator's current state, collects the
//! user's edits and applies them after drawing, so the coordinator is never
//! borrowed by the UI while it mutates.

use egui::RichText;
use tracing::info;

use super::rendering::{render_control, render_no_device};
use crate::coordinator::{Coordinator, Notice};
use crate::grid::ControlSlot;
use crate::transport::MidirBackend;

/// Edits collected while drawing a frame
#[derive(Debug, Default)]
struct FrameActions {
    refresh: bool,
    select: Option<usize>,
    channel: Option<i32>,
    values: Vec<(ControlSlot, i32)>,
}

/// Control panel application
pub struct ControllerApp {
    coordinator: Coordinator<MidirBackend>,
    /// Warnings waiting to be acknowledged, oldest first
    notices: Vec<Notice>,
    shut_down: bool,
}

impl ControllerApp {
    /// Create the app and populate the device selector
    pub fn new(mut coordinator: Coordinator<MidirBackend>) -> Self {
        coordinator.refresh_ports();
        let notices = coordinator.take_notices();

        Self {
            coordinator,
            notices,
            shut_down: false,
        }
    }

    fn render_top_bar(&self, ui: &mut egui::Ui, actions: &mut FrameActions) {
        ui.horizontal(|ui| {
            ui.label("Device:");

            let choices = self.coordinator.choices();
            let selected_text = self
                .coordinator
                .selected()
                .and_then(|i| choices.get(i))
                .or_else(|| choices.first())
                .map(|c| c.label().to_string())
                .unwrap_or_default();

            egui::ComboBox::from_id_salt("device_selector")
                .width(260.0)
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (index, choice) in choices.iter().enumerate() {
                        let is_selected = self.coordinator.selected() == Some(index);
                        let item = egui::SelectableLabel::new(is_selected, choice.label());
                        if ui.add_enabled(choice.is_selectable(), item).clicked() && !is_selected {
                            actions.select = Some(index);
                        }
                    }
                });

            if ui.button("Refresh").clicked() {
                actions.refresh = true;
            }

            ui.add_space(12.0);
            ui.label("Channel:");

            let mut channel = self.coordinator.channel() as i32;
            let response = ui.add(egui::DragValue::new(&mut channel).range(1..=16));
            if response.changed() {
                actions.channel = Some(channel);
            }
        });
    }

    fn render_grid(&self, ui: &mut egui::Ui, actions: &mut FrameActions) {
        let Some(active) = self.coordinator.active_device() else {
            render_no_device(ui, !self.coordinator.config().is_empty());
            return;
        };

        egui::ScrollArea::both().show(ui, |ui| {
            for (row_index, row) in active.grid.rows().iter().enumerate() {
                if row.separator_before {
                    ui.separator();
                }

                ui.horizontal_top(|ui| {
                    for (column, control) in row.controls.iter().enumerate() {
                        if let Some(value) = render_control(ui, control) {
                            let slot = ControlSlot {
                                row: row_index,
                                column,
                            };
                            actions.values.push((slot, value));
                        }
                    }
                });
            }
        });
    }

    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.first() else {
            return;
        };

        let mut acknowledged = false;
        egui::Window::new(RichText::new(&notice.title).strong())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&notice.message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    acknowledged = true;
                }
            });

        if acknowledged {
            self.notices.remove(0);
        }
    }

    fn apply(&mut self, actions: FrameActions) {
        if let Some(channel) = actions.channel {
            self.coordinator.set_channel(channel);
        }
        if actions.refresh {
            self.coordinator.refresh_ports();
        }
        if let Some(index) = actions.select {
            self.coordinator.select_port(index);
        }
        for (slot, value) in actions.values {
            self.coordinator.set_control_at(slot, value);
        }

        self.notices.extend(self.coordinator.take_notices());
    }
}

impl eframe::App for ControllerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = FrameActions::default();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.render_top_bar(ui, &mut actions);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_grid(ui, &mut actions);
        });

        self.render_notice(ctx);
        self.apply(actions);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if !self.shut_down {
            info!("Window closed, saving state");
            self.coordinator.shutdown();
            self.shut_down = true;
        }
    }
}

//! Rendering functions for the control grid
//!
//! Each function draws one control and returns the value the user dialled
//! in this frame, if any. Applying it is left to the coordinator.

use egui::{Color32, RichText, Sense, Vec2};

use super::drawing::{drag_steps, draw_knob, knob_fraction};
use crate::controls::{Control, Widget};

const KNOB_SIZE: f32 = 56.0;
const CONTROL_WIDTH: f32 = 76.0;

/// Drag distance per step on a continuous knob
const CONTINUOUS_PIXELS_PER_STEP: f32 = 2.0;

/// Drag distance per detent on a multi-option knob
const OPTION_PIXELS_PER_STEP: f32 = 24.0;

const CONTINUOUS_COLOR: Color32 = Color32::from_rgb(255, 170, 80);
const OPTION_COLOR: Color32 = Color32::from_rgb(150, 200, 255);

/// Render one control with its name above and its value label below
pub fn render_control(ui: &mut egui::Ui, control: &Control) -> Option<i32> {
    let mut edit = None;

    ui.vertical(|ui| {
        ui.set_width(CONTROL_WIDTH);
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(&control.name).strong().size(13.0));

            edit = match &control.widget {
                Widget::Continuous(_) => {
                    render_knob(ui, control, CONTINUOUS_PIXELS_PER_STEP, 0, CONTINUOUS_COLOR)
                }
                Widget::MultiOption(knob) => render_knob(
                    ui,
                    control,
                    OPTION_PIXELS_PER_STEP,
                    knob.options().len(),
                    OPTION_COLOR,
                ),
                Widget::Toggle(toggle) => render_toggle(ui, toggle.is_on()),
            };

            if !matches!(control.widget, Widget::Toggle(_)) {
                ui.label(
                    RichText::new(control.label())
                        .color(Color32::from_gray(200))
                        .family(egui::FontFamily::Monospace),
                );
            }
        });
    });

    edit
}

/// Knob driven by vertical drag and the scroll wheel
fn render_knob(
    ui: &mut egui::Ui,
    control: &Control,
    pixels_per_step: f32,
    notches: usize,
    color: Color32,
) -> Option<i32> {
    let (rect, response) = ui.allocate_exact_size(Vec2::splat(KNOB_SIZE), Sense::click_and_drag());

    let range = control.range();
    let value = control.value();
    let mut steps = 0;

    // Leftover drag pixels are kept between frames so slow drags still move
    let drag_id = response.id.with("drag");
    if response.dragged() {
        let accumulated = ui.data(|d| d.get_temp::<f32>(drag_id).unwrap_or(0.0))
            - response.drag_delta().y;
        let (moved, rest) = drag_steps(accumulated, pixels_per_step);
        ui.data_mut(|d| d.insert_temp(drag_id, rest));
        steps += moved;
    }
    if response.drag_stopped() {
        ui.data_mut(|d| d.remove::<f32>(drag_id));
    }

    if response.hovered() {
        steps += ui.input_mut(take_scroll_steps);
    }

    if ui.is_rect_visible(rect) {
        draw_knob(
            ui.painter(),
            rect.center(),
            KNOB_SIZE / 2.0 - 8.0,
            knob_fraction(value, &range),
            notches,
            color,
        );
    }

    let new_value = (value + steps).clamp(*range.start(), *range.end());
    (new_value != value).then_some(new_value)
}

/// One step per scroll event, consuming the scroll so the enclosing
/// `ScrollArea` stays put while a knob is hovered
fn take_scroll_steps(input: &mut egui::InputState) -> i32 {
    let scroll = input.raw_scroll_delta.y;
    input.raw_scroll_delta = Vec2::ZERO;
    input.smooth_scroll_delta = Vec2::ZERO;

    if scroll > 0.0 {
        1
    } else if scroll < 0.0 {
        -1
    } else {
        0
    }
}

/// ON/OFF button
fn render_toggle(ui: &mut egui::Ui, on: bool) -> Option<i32> {
    let text = if on { "ON" } else { "OFF" };
    let button = egui::Button::new(RichText::new(text).strong())
        .selected(on)
        .min_size(Vec2::new(40.0, 28.0));

    ui.add(button).clicked().then_some(i32::from(!on))
}

/// Placeholder shown when no device is active
pub fn render_no_device(ui: &mut egui::Ui, has_devices: bool) {
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(
            RichText::new("No device selected")
                .size(16.0)
                .color(Color32::from_rgb(255, 200, 100)),
        );
        let hint = if has_devices {
            "Connect a configured device and press Refresh"
        } else {
            "No devices configured in controls.json"
        };
        ui.label(RichText::new(hint).color(Color32::from_gray(150)));
    });
}

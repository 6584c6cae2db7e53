//! Low-level drawing primitives for the knobs
//!
//! Knob angles are measured clockwise from 12 o'clock and sweep 270°, from
//! 7:30 at the minimum to 4:30 at the maximum.

use egui::{Color32, Painter, Pos2, Stroke};
use std::ops::RangeInclusive;

/// Total travel of a knob pointer
pub const SWEEP_DEGREES: f32 = 270.0;

/// Segments used to draw the value arc
const ARC_SEGMENTS: usize = 32;

/// Position of `value` along `range`, 0.0 to 1.0
pub fn knob_fraction(value: i32, range: &RangeInclusive<i32>) -> f32 {
    let span = range.end() - range.start();
    if span <= 0 {
        return 0.0;
    }
    ((value - range.start()) as f32 / span as f32).clamp(0.0, 1.0)
}

/// Pointer angle in radians for a travel fraction
pub fn knob_angle(fraction: f32) -> f32 {
    (fraction.clamp(0.0, 1.0) - 0.5) * SWEEP_DEGREES.to_radians()
}

/// Split accumulated drag distance into whole steps and the leftover pixels
pub fn drag_steps(accumulated: f32, pixels_per_step: f32) -> (i32, f32) {
    let steps = (accumulated / pixels_per_step).trunc();
    (steps as i32, accumulated - steps * pixels_per_step)
}

fn point_at(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    egui::pos2(center.x + radius * angle.sin(), center.y - radius * angle.cos())
}

/// Draw a knob body with value arc, pointer and optional detent notches
pub fn draw_knob(
    painter: &Painter,
    center: Pos2,
    radius: f32,
    fraction: f32,
    notches: usize,
    color: Color32,
) {
    painter.circle_filled(center, radius, Color32::from_gray(30));
    painter.circle_stroke(center, radius, Stroke::new(1.0, Color32::from_gray(100)));

    if notches > 1 {
        for i in 0..notches {
            let angle = knob_angle(i as f32 / (notches - 1) as f32);
            painter.line_segment(
                [
                    point_at(center, radius + 2.0, angle),
                    point_at(center, radius + 6.0, angle),
                ],
                Stroke::new(1.0, Color32::from_gray(120)),
            );
        }
    }

    if fraction > 0.0 {
        let arc: Vec<Pos2> = (0..=ARC_SEGMENTS)
            .map(|i| {
                let t = fraction * i as f32 / ARC_SEGMENTS as f32;
                point_at(center, radius - 4.0, knob_angle(t))
            })
            .collect();
        painter.add(egui::Shape::line(arc, Stroke::new(3.0, color)));
    }

    painter.line_segment(
        [center, point_at(center, radius - 6.0, knob_angle(fraction))],
        Stroke::new(2.0, Color32::from_gray(230)),
    );
    painter.circle_filled(center, 3.0, Color32::from_gray(230));
}

//! Control models behind the on-screen widgets
//!
//! Each control holds a bounded integer, renders it as a label and reports a
//! [`ControlEvent`] whenever its value changes. The GUI only draws these and
//! feeds user edits back through [`Control::set_value`].

use std::ops::RangeInclusive;

use crate::config::{ControlKind, ControlSpec};

/// Upper bound of a continuous knob
pub const CONTINUOUS_MAX: i32 = 127;

/// Capability set shared by all control variants
pub trait ControlValue {
    /// Current raw value
    fn value(&self) -> i32;

    /// Store `value` clamped to [`ControlValue::range`]. Returns true when
    /// the stored value changed.
    fn set_value(&mut self, value: i32) -> bool;

    /// Text shown under the control
    fn label(&self) -> String;

    /// Valid values
    fn range(&self) -> RangeInclusive<i32>;
}

/// 0-127 knob displayed on a 0.0-10.0 gain scale
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousKnob {
    value: i32,
}

impl ContinuousKnob {
    pub fn new() -> Self {
        Self { value: 0 }
    }
}

impl Default for ContinuousKnob {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlValue for ContinuousKnob {
    fn value(&self) -> i32 {
        self.value
    }

    fn set_value(&mut self, value: i32) -> bool {
        let value = value.clamp(0, CONTINUOUS_MAX);
        let changed = value != self.value;
        self.value = value;
        changed
    }

    fn label(&self) -> String {
        format!("{:.1}", self.value as f64 * 10.0 / CONTINUOUS_MAX as f64)
    }

    fn range(&self) -> RangeInclusive<i32> {
        0..=CONTINUOUS_MAX
    }
}

/// Knob stepping through a fixed list of labels
#[derive(Debug, Clone, PartialEq)]
pub struct OptionKnob {
    index: i32,
    options: Vec<String>,
}

impl OptionKnob {
    pub fn new(options: Vec<String>) -> Self {
        Self { index: 0, options }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    fn max_index(&self) -> i32 {
        (self.options.len() as i32 - 1).max(0)
    }
}

impl ControlValue for OptionKnob {
    fn value(&self) -> i32 {
        self.index
    }

    fn set_value(&mut self, value: i32) -> bool {
        let value = value.clamp(0, self.max_index());
        let changed = value != self.index;
        self.index = value;
        changed
    }

    fn label(&self) -> String {
        self.options
            .get(self.index as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn range(&self) -> RangeInclusive<i32> {
        0..=self.max_index()
    }
}

/// ON/OFF button
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleButton {
    on: bool,
}

impl ToggleButton {
    pub fn new(initial_off: bool) -> Self {
        Self { on: !initial_off }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl ControlValue for ToggleButton {
    fn value(&self) -> i32 {
        i32::from(self.on)
    }

    fn set_value(&mut self, value: i32) -> bool {
        let on = value != 0;
        let changed = on != self.on;
        self.on = on;
        changed
    }

    fn label(&self) -> String {
        let text = if self.on { "ON" } else { "OFF" };
        text.to_string()
    }

    fn range(&self) -> RangeInclusive<i32> {
        0..=1
    }
}

/// The concrete widget behind a control
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Continuous(ContinuousKnob),
    MultiOption(OptionKnob),
    Toggle(ToggleButton),
}

impl Widget {
    fn as_value(&self) -> &dyn ControlValue {
        match self {
            Widget::Continuous(w) => w,
            Widget::MultiOption(w) => w,
            Widget::Toggle(w) => w,
        }
    }

    fn as_value_mut(&mut self) -> &mut dyn ControlValue {
        match self {
            Widget::Continuous(w) => w,
            Widget::MultiOption(w) => w,
            Widget::Toggle(w) => w,
        }
    }
}

/// Value change emitted by a control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEvent {
    pub id: String,
    pub cc: u8,
    pub value: i32,
}

/// A live control bound to its config entry
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: String,
    pub name: String,
    pub cc: u8,
    pub widget: Widget,
}

impl Control {
    /// Instantiate the widget for `spec`. Unknown control types yield `None`.
    pub fn from_spec(spec: &ControlSpec) -> Option<Self> {
        let widget = match spec.kind {
            ControlKind::Continuous => Widget::Continuous(ContinuousKnob::new()),
            ControlKind::MultiOption => Widget::MultiOption(OptionKnob::new(spec.texts.clone())),
            ControlKind::Toggle => Widget::Toggle(ToggleButton::new(spec.starts_off())),
            ControlKind::Unknown => return None,
        };

        Some(Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            cc: spec.cc,
            widget,
        })
    }

    /// Set the value, returning the change notification if it changed
    pub fn set_value(&mut self, value: i32) -> Option<ControlEvent> {
        if !self.widget.as_value_mut().set_value(value) {
            return None;
        }
        Some(ControlEvent {
            id: self.id.clone(),
            cc: self.cc,
            value: self.value(),
        })
    }

    pub fn value(&self) -> i32 {
        self.widget.as_value().value()
    }

    pub fn label(&self) -> String {
        self.widget.as_value().label()
    }

    pub fn range(&self) -> RangeInclusive<i32> {
        self.widget.as_value().range()
    }
}

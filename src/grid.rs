//! Control grid built from a device layout

use std::collections::BTreeMap;
use tracing::warn;

use crate::config::{ControlKind, DeviceConfig};
use crate::controls::Control;
use crate::state::DeviceValues;

/// One rendered row
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// Row index from the config
    pub index: i64,
    /// Draw a separator line above this row
    pub separator_before: bool,
    /// Controls, left to right
    pub controls: Vec<Control>,
}

/// Position of a control: row position in [`ControlGrid::rows`] and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlSlot {
    pub row: usize,
    pub column: usize,
}

/// All live controls of the active device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlGrid {
    rows: Vec<GridRow>,
}

impl ControlGrid {
    /// Instantiate one control per layout item.
    ///
    /// Rows are ordered by ascending row index. Items of layout entries that
    /// share a row index continue the same row. Every row after the first
    /// gets a separator.
    pub fn build(device: &DeviceConfig) -> Self {
        let mut by_index: BTreeMap<i64, Vec<Control>> = BTreeMap::new();

        for layout_row in &device.layout {
            let controls = by_index.entry(layout_row.row).or_default();
            for spec in &layout_row.items {
                if spec.kind == ControlKind::MultiOption && spec.texts.is_empty() {
                    warn!(
                        "Control '{}' in device '{}' has no option texts",
                        spec.id, device.name
                    );
                }
                match Control::from_spec(spec) {
                    Some(control) => controls.push(control),
                    None => warn!(
                        "Skipping control '{}' with unknown type in device '{}'",
                        spec.id, device.name
                    ),
                }
            }
        }

        let rows = by_index
            .into_iter()
            .enumerate()
            .map(|(position, (index, controls))| GridRow {
                index,
                separator_before: position > 0,
                controls,
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    /// All controls in display order
    pub fn controls(&self) -> impl Iterator<Item = &Control> {
        self.rows.iter().flat_map(|row| row.controls.iter())
    }

    pub fn controls_mut(&mut self) -> impl Iterator<Item = &mut Control> {
        self.rows.iter_mut().flat_map(|row| row.controls.iter_mut())
    }

    pub fn control_at_mut(&mut self, slot: ControlSlot) -> Option<&mut Control> {
        self.rows.get_mut(slot.row)?.controls.get_mut(slot.column)
    }

    /// Slot of the first control with the given id. Empty ids never match.
    pub fn slot_of(&self, id: &str) -> Option<ControlSlot> {
        if id.is_empty() {
            return None;
        }
        self.rows.iter().enumerate().find_map(|(row, grid_row)| {
            let column = grid_row.controls.iter().position(|c| c.id == id)?;
            Some(ControlSlot { row, column })
        })
    }

    /// Current values keyed by control id. Controls without an id are left out.
    pub fn snapshot(&self) -> DeviceValues {
        self.controls()
            .filter(|control| !control.id.is_empty())
            .map(|control| (control.id.clone(), control.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.controls().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

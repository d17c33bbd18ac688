//! Selection Coordinator and filter chips.
//!
//! The selection is a toggling set of indices into the displayed items. An optional
//! maximum is enforced with a two-phase commit: every change is validated
//! synchronously and either committed (published) or answered with a scheduled
//! rollback of the indices selected since the last stable snapshot. Until the host
//! runs the deferred rollback the over-selected state is observable on the raw
//! selection, but it is never committed.

use crate::{FilterChipDetails, GridError, GridResult, Item};
use std::collections::BTreeSet;

/// Toggling multi-selection over displayed row indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<usize>,
}

impl Selection {
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn set_index_selected(&mut self, index: usize, selected: bool) {
        if selected {
            self.selected.insert(index);
        } else {
            self.selected.remove(&index);
        }
    }

    pub fn toggle(&mut self, index: usize) {
        let selected = !self.is_selected(index);
        self.set_index_selected(index, selected);
    }

    /// Selected indices in ascending order.
    pub fn indices(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

/// Result of validating a selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Within budget: these indices are now the published selection.
    Committed(Vec<usize>),
    /// Over budget: these newly selected indices will be deselected by
    /// `SelectionCoordinator::run_deferred`.
    RollbackScheduled(Vec<usize>),
}

/// Enforces the maximum selection count over a `Selection`.
#[derive(Debug, Clone, Default)]
pub struct SelectionCoordinator {
    selection: Selection,
    max_selection_count: Option<usize>,
    /// Last stable snapshot; not advanced while a rollback is pending.
    previous: Vec<usize>,
    committed: Vec<usize>,
    pending_rollback: Vec<usize>,
}

impl SelectionCoordinator {
    pub fn new(max_selection_count: Option<usize>) -> Self {
        SelectionCoordinator {
            max_selection_count,
            ..Default::default()
        }
    }

    /// Raw selection, including a transient over-selection awaiting rollback.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Indices of the last committed selection.
    pub fn committed_indices(&self) -> &[usize] {
        &self.committed
    }

    pub fn has_pending_rollback(&self) -> bool {
        !self.pending_rollback.is_empty()
    }

    /// Toggles one row and validates the result.
    pub fn toggle(&mut self, index: usize) -> SelectionOutcome {
        self.selection.toggle(index);
        self.on_selection_changed()
    }

    pub fn set_index_selected(&mut self, index: usize, selected: bool) -> SelectionOutcome {
        self.selection.set_index_selected(index, selected);
        self.on_selection_changed()
    }

    /// Validates the current selection against the maximum.
    ///
    /// ### Logic
    /// * Over the maximum: the indices absent from the previous snapshot are queued
    ///   for rollback and the snapshot is left unchanged.
    /// * Otherwise: the selection, minus any rows still awaiting rollback, is
    ///   committed and becomes the new snapshot.
    pub fn on_selection_changed(&mut self) -> SelectionOutcome {
        let current = self.selection.indices();

        if let Some(max) = self.max_selection_count
            && current.len() > max
        {
            let newly_selected: Vec<usize> = current
                .iter()
                .copied()
                .filter(|index| !self.previous.contains(index))
                .collect();
            tracing::warn!(
                "Selection of {} rows exceeds the maximum of {}; rolling back {:?}",
                current.len(),
                max,
                newly_selected
            );
            self.pending_rollback = newly_selected.clone();
            return SelectionOutcome::RollbackScheduled(newly_selected);
        }

        // A scheduled rollback survives in-budget changes until `run_deferred`;
        // its rows are never committed.
        let selection = &self.selection;
        self.pending_rollback.retain(|index| selection.is_selected(*index));
        let committed: Vec<usize> = current
            .into_iter()
            .filter(|index| !self.pending_rollback.contains(index))
            .collect();

        tracing::debug!("Selection committed: {:?}", committed);
        self.previous = committed.clone();
        self.committed = committed.clone();
        SelectionOutcome::Committed(committed)
    }

    /// Runs the scheduled rollback, if any, and re-validates.
    ///
    /// The host calls this after the toggle that caused the over-selection has settled.
    pub fn run_deferred(&mut self) -> Option<SelectionOutcome> {
        if self.pending_rollback.is_empty() {
            return None;
        }
        for index in std::mem::take(&mut self.pending_rollback) {
            self.selection.set_index_selected(index, false);
        }
        Some(self.on_selection_changed())
    }

    /// Drops every selected index (the displayed set was replaced).
    pub fn reset(&mut self) {
        self.selection.clear();
        self.previous.clear();
        self.committed.clear();
        self.pending_rollback.clear();
    }

    /// Committed selection resolved against the displayed items.
    pub fn committed_items(&self, displayed: &[Item]) -> Vec<Item> {
        self.committed
            .iter()
            .filter_map(|index| displayed.get(*index))
            .cloned()
            .collect()
    }

    /// Deselects the committed item whose chip key is `key`.
    ///
    /// ### Returns
    /// The removed item and the outcome of the new selection.
    ///
    /// ### Errors
    /// `MissingChipDetails` without chip configuration, `ChipNotFound` if no committed
    /// item carries `key`.
    pub fn remove_chip(
        &mut self,
        displayed: &[Item],
        details: Option<&FilterChipDetails>,
        key: &str,
    ) -> GridResult<(Item, SelectionOutcome)> {
        let details = details.ok_or(GridError::MissingChipDetails)?;

        let (index, item) = self
            .committed
            .iter()
            .filter_map(|index| displayed.get(*index).map(|item| (*index, item)))
            .find(|(_, item)| chip_key(item, details) == key)
            .ok_or_else(|| GridError::ChipNotFound(key.to_string()))?;
        let item = item.clone();

        tracing::debug!("Filter chip '{}' removed (row {})", key, index);
        let outcome = self.set_index_selected(index, false);
        Ok((item, outcome))
    }
}

/// Compact display of one selected item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub key: String,
    pub value: String,
}

fn chip_key(item: &Item, details: &FilterChipDetails) -> String {
    item.text(&details.key_field).unwrap_or_default()
}

/// One chip per selected item, in selection order.
pub fn filter_chips(selected: &[Item], details: &FilterChipDetails) -> Vec<FilterChip> {
    selected
        .iter()
        .map(|item| FilterChip {
            key: chip_key(item, details),
            value: item.text(&details.label_field).unwrap_or_default(),
        })
        .collect()
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

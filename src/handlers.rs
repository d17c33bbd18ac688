//! Host callbacks: evaluation overrides and observers.
//!
//! A sort or filter override replaces the built-in evaluation entirely; the column
//! flags are still updated by the transition. The `default_*_applied` observers fire
//! only when the built-in evaluation ran.

use crate::{Column, Item};
use std::fmt;

/// `(filtered_columns, sort_column)`
pub type SortOverride = Box<dyn FnMut(&[Column], &Column)>;

/// `(filtered_columns, sort_column)`
pub type FilterOverride = Box<dyn FnMut(&[Column], Option<&Column>)>;

/// `(displayed_items, filtered_columns, sort_column)`
pub type EvaluationObserver = Box<dyn FnMut(&[Item], &[Column], Option<&Column>)>;

pub type SelectionChanged = Box<dyn FnMut(&[Item])>;

/// `(item, displayed_index)`
pub type RowInvoked = Box<dyn FnMut(&Item, usize)>;

pub type ChipRemoved = Box<dyn FnMut(&Item)>;

/// Optional callbacks supplied by the host. All run on the caller's thread.
#[derive(Default)]
pub struct GridHandlers {
    pub(crate) on_sort: Option<SortOverride>,
    pub(crate) on_filter: Option<FilterOverride>,
    pub(crate) on_default_sort_applied: Option<EvaluationObserver>,
    pub(crate) on_default_filter_applied: Option<EvaluationObserver>,
    pub(crate) on_selection_change: Option<SelectionChanged>,
    pub(crate) on_row_invoked: Option<RowInvoked>,
    pub(crate) on_filter_chip_remove: Option<ChipRemoved>,
}

impl fmt::Debug for GridHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridHandlers")
            .field("on_sort", &self.on_sort.is_some())
            .field("on_filter", &self.on_filter.is_some())
            .field("on_default_sort_applied", &self.on_default_sort_applied.is_some())
            .field(
                "on_default_filter_applied",
                &self.on_default_filter_applied.is_some(),
            )
            .field("on_selection_change", &self.on_selection_change.is_some())
            .field("on_row_invoked", &self.on_row_invoked.is_some())
            .field("on_filter_chip_remove", &self.on_filter_chip_remove.is_some())
            .finish()
    }
}

impl GridHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the built-in sort.
    pub fn with_sort_override(mut self, handler: impl FnMut(&[Column], &Column) + 'static) -> Self {
        self.on_sort = Some(Box::new(handler));
        self
    }

    /// Replaces the built-in filter.
    pub fn with_filter_override(
        mut self,
        handler: impl FnMut(&[Column], Option<&Column>) + 'static,
    ) -> Self {
        self.on_filter = Some(Box::new(handler));
        self
    }

    pub fn with_default_sort_observer(
        mut self,
        observer: impl FnMut(&[Item], &[Column], Option<&Column>) + 'static,
    ) -> Self {
        self.on_default_sort_applied = Some(Box::new(observer));
        self
    }

    pub fn with_default_filter_observer(
        mut self,
        observer: impl FnMut(&[Item], &[Column], Option<&Column>) + 'static,
    ) -> Self {
        self.on_default_filter_applied = Some(Box::new(observer));
        self
    }

    pub fn with_selection_change(mut self, handler: impl FnMut(&[Item]) + 'static) -> Self {
        self.on_selection_change = Some(Box::new(handler));
        self
    }

    /// Row double-click / activation.
    pub fn with_row_invoked(mut self, handler: impl FnMut(&Item, usize) + 'static) -> Self {
        self.on_row_invoked = Some(Box::new(handler));
        self
    }

    pub fn with_filter_chip_remove(mut self, handler: impl FnMut(&Item) + 'static) -> Self {
        self.on_filter_chip_remove = Some(Box::new(handler));
        self
    }

    pub fn overrides_sort(&self) -> bool {
        self.on_sort.is_some()
    }

    pub fn overrides_filter(&self) -> bool {
        self.on_filter.is_some()
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

//! Column State Machine as pure transitions: `(columns, action) -> columns`.
//!
//! Each transition returns a new column collection plus the re-evaluation it calls
//! for. The caller (`DetailsGrid`) swaps the collection in atomically and then runs
//! the effect, so the evaluation always reads the post-transition state.
//!
//! Invariants kept by every transition:
//! * at most one column is sorted;
//! * `is_filtered == !applied_filters.is_empty()`;
//! * a NumberRange column holds at most one `minvalue` and one `maxvalue` entry,
//!   min first.

use crate::{
    AppliedFilter, Column, FieldType, FilterKey, GridError, GridResult, SortDirection,
};

/// A user (or replayed initial) action on the column collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnAction {
    /// Sort by one column in one direction.
    ChooseSort {
        field_name: String,
        direction: SortDirection,
    },
    /// Add the value if absent, remove it if present. NumberRange columns upsert instead.
    ToggleFilterValue {
        field_name: String,
        filter_key: FilterKey,
        filter_text: String,
    },
    /// Remove one applied value by key (the "x" next to an applied value).
    RemoveFilterValue {
        field_name: String,
        filter_key: FilterKey,
    },
    /// Upsert numeric bounds by key; blank texts are ignored.
    SetRangeBounds {
        field_name: String,
        bounds: Vec<AppliedFilter>,
    },
    ClearColumnFilter {
        field_name: String,
    },
    ClearAllFilters,
}

impl ColumnAction {
    pub fn choose_sort(field_name: &str, direction: SortDirection) -> Self {
        ColumnAction::ChooseSort {
            field_name: field_name.to_string(),
            direction,
        }
    }

    pub fn toggle(field_name: &str, filter_key: impl Into<FilterKey>, filter_text: &str) -> Self {
        ColumnAction::ToggleFilterValue {
            field_name: field_name.to_string(),
            filter_key: filter_key.into(),
            filter_text: filter_text.to_string(),
        }
    }

    pub fn remove(field_name: &str, filter_key: impl Into<FilterKey>) -> Self {
        ColumnAction::RemoveFilterValue {
            field_name: field_name.to_string(),
            filter_key: filter_key.into(),
        }
    }

    /// Range bounds action; `None` leaves a bound untouched.
    pub fn range(field_name: &str, min: Option<&str>, max: Option<&str>) -> Self {
        let bounds = [(FilterKey::min_value(), min), (FilterKey::max_value(), max)]
            .into_iter()
            .filter_map(|(key, text)| text.map(|text| AppliedFilter::new(key, text)))
            .collect();
        ColumnAction::SetRangeBounds {
            field_name: field_name.to_string(),
            bounds,
        }
    }

    pub fn clear_column(field_name: &str) -> Self {
        ColumnAction::ClearColumnFilter {
            field_name: field_name.to_string(),
        }
    }
}

/// Re-evaluation requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing changed.
    None,
    /// Sort the corpus by the sorted column, then re-apply the stored filters.
    Sort,
    /// Filter the corpus by the filtered columns, then sort by the stored sort column.
    Filter,
}

/// New column state plus the requested re-evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub columns: Vec<Column>,
    pub effect: Effect,
}

/// Applies `action` to a copy of `columns`.
///
/// ### Errors
/// * `UnknownColumn` if the action names a field absent from the collection.
/// * `NotFilterable` if a filter action targets a column that does not accept filters.
pub fn transition(columns: &[Column], action: &ColumnAction) -> GridResult<Transition> {
    let mut columns = columns.to_vec();

    let effect = match action {
        ColumnAction::ChooseSort {
            field_name,
            direction,
        } => choose_sort(&mut columns, field_name, *direction)?,
        ColumnAction::ToggleFilterValue {
            field_name,
            filter_key,
            filter_text,
        } => {
            let column = filter_target(&mut columns, field_name)?;
            if column.filter_field_type() == Some(FieldType::NumberRange) {
                upsert_bounds(column, &[AppliedFilter::new(filter_key.clone(), filter_text)]);
            } else {
                toggle_value(column, filter_key, filter_text);
            }
            Effect::Filter
        }
        ColumnAction::RemoveFilterValue {
            field_name,
            filter_key,
        } => {
            let column = filter_target(&mut columns, field_name)?;
            let mut applied = column.applied_filters.clone();
            applied.retain(|af| &af.filter_key != filter_key);
            column.set_applied_filters(applied);
            Effect::Filter
        }
        ColumnAction::SetRangeBounds { field_name, bounds } => {
            upsert_bounds(filter_target(&mut columns, field_name)?, bounds);
            Effect::Filter
        }
        ColumnAction::ClearColumnFilter { field_name } => {
            filter_target(&mut columns, field_name)?.clear_filters();
            Effect::Filter
        }
        ColumnAction::ClearAllFilters => {
            columns.iter_mut().for_each(Column::clear_filters);
            Effect::Filter
        }
    };

    tracing::debug!("transition(): {:?} -> {:?}", action, effect);
    Ok(Transition { columns, effect })
}

/// Marks the target column sorted and clears the flag on every other column.
/// Choosing the current sort again is a no-op.
fn choose_sort(
    columns: &mut [Column],
    field_name: &str,
    direction: SortDirection,
) -> GridResult<Effect> {
    let target = columns
        .iter()
        .position(|column| column.field_name == field_name)
        .ok_or_else(|| GridError::UnknownColumn(field_name.to_string()))?;

    let current = &columns[target];
    if current.is_sorted() && current.is_sorted_descending() == direction.is_descending() {
        tracing::trace!("'{}' is already sorted {:?}", field_name, direction);
        return Ok(Effect::None);
    }

    for (index, column) in columns.iter_mut().enumerate() {
        if index == target {
            column.set_sorted(direction.is_descending());
        } else {
            column.clear_sorted();
        }
    }
    Ok(Effect::Sort)
}

fn filter_target<'a>(columns: &'a mut [Column], field_name: &str) -> GridResult<&'a mut Column> {
    let column = columns
        .iter_mut()
        .find(|column| column.field_name == field_name)
        .ok_or_else(|| GridError::UnknownColumn(field_name.to_string()))?;

    if !column.accepts_filters() {
        return Err(GridError::NotFilterable(field_name.to_string()));
    }
    Ok(column)
}

/// Membership toggle by key.
fn toggle_value(column: &mut Column, filter_key: &FilterKey, filter_text: &str) {
    let mut applied = column.applied_filters.clone();
    if applied.iter().any(|af| &af.filter_key == filter_key) {
        applied.retain(|af| &af.filter_key != filter_key);
    } else {
        applied.push(AppliedFilter::new(filter_key.clone(), filter_text));
    }
    column.set_applied_filters(applied);
}

/// Upserts bounds by key, skipping blank texts, then reorders to `[min, max]`.
fn upsert_bounds(column: &mut Column, bounds: &[AppliedFilter]) {
    let mut applied = column.applied_filters.clone();

    for bound in bounds.iter().filter(|bound| !bound.filter_text.trim().is_empty()) {
        match applied.iter_mut().find(|af| af.filter_key == bound.filter_key) {
            Some(existing) => existing.filter_text = bound.filter_text.clone(),
            None => applied.push(bound.clone()),
        }
    }

    if applied.len() > 1 {
        let min = applied.iter().find(|af| af.filter_key.is_min_value()).cloned();
        let max = applied.iter().find(|af| af.filter_key.is_max_value()).cloned();
        applied = min.into_iter().chain(max).collect();
    }

    column.set_applied_filters(applied);
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

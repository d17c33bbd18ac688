//! Headless column context menu: what the header menu shows for a column.
//!
//! The rendering layer turns a `ColumnMenu` into widgets and reports clicks back as
//! `ColumnAction`s. Sort entries and filter editors are chosen by dispatch tables
//! over the column's sort and filter field types.

use crate::{
    Column, FieldType, FilterKey, FilterOption, Item, SortDirection, SortState, menu_options,
};

/// Heading of the filter section.
pub const FILTER_SECTION_HEADING: &str = "Filter By";

/// Label of the per-column clear entry.
pub const CLEAR_FILTER_LABEL: &str = "Clear filter";

/// One checkable sort entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortMenuItem {
    pub key: &'static str,
    pub label: &'static str,
    pub direction: SortDirection,
    pub checked: bool,
}

/// Input widget offered by the filter section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEditor {
    /// Free text search; each submitted text is toggled as a value.
    TextSearch,
    /// Numeric search; submitted bounds are toggled by key.
    NumberSearch,
    /// Min/max pair; submitted bounds are upserted.
    NumberRange {
        min: Option<String>,
        max: Option<String>,
    },
    /// Option list with the applied options pre-selected.
    ComboBox {
        options: Vec<FilterOption>,
        selected_keys: Vec<FilterKey>,
        /// PartialChoice accepts text that is not among the options.
        free_form: bool,
    },
}

/// An applied value listed for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFilterEntry {
    pub filter_key: FilterKey,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMenu {
    pub editor: FilterEditor,
    pub applied: Vec<AppliedFilterEntry>,
    /// The clear entry is enabled only while the column is filtered.
    pub clear_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMenu {
    pub field_name: String,
    pub sort_items: Vec<SortMenuItem>,
    pub filter: Option<FilterMenu>,
}

/// Menu-builder dispatch table for sort entries: FieldType -> (key, label) pairs.
fn sort_labels(field_type: FieldType) -> [(&'static str, &'static str); 2] {
    match field_type {
        FieldType::Number | FieldType::NumberRange => [
            ("ascNumber", "Sorting - Smaller to larger"),
            ("descNumber", "Sorting - Larger to smaller"),
        ],
        FieldType::Date | FieldType::Time => {
            [("ascDate", "Older to newer"), ("descDate", "Newer to older")]
        }
        FieldType::Text | FieldType::Choice | FieldType::PartialChoice => {
            [("ascText", "Sorting - A to Z"), ("descText", "Sorting - Z to A")]
        }
    }
}

fn sort_menu_items(column: &Column) -> Vec<SortMenuItem> {
    let Some(field_type) = column.sort_field_type() else {
        return Vec::new();
    };
    let state = SortState::of(column);
    let [(asc_key, asc_label), (desc_key, desc_label)] = sort_labels(field_type);

    vec![
        SortMenuItem {
            key: asc_key,
            label: asc_label,
            direction: SortDirection::Asc,
            checked: state == SortState::Ascending,
        },
        SortMenuItem {
            key: desc_key,
            label: desc_label,
            direction: SortDirection::Desc,
            checked: state == SortState::Descending,
        },
    ]
}

/// Applied keys resolved against the options: by key first, then by text
/// (replayed initial filters carry their text as key).
fn selected_keys(column: &Column, options: &[FilterOption]) -> Vec<FilterKey> {
    column
        .applied_filters()
        .iter()
        .filter_map(|applied| {
            options
                .iter()
                .find(|option| option.key == applied.filter_key)
                .or_else(|| {
                    options
                        .iter()
                        .find(|option| option.text == applied.filter_text)
                })
                .map(|option| option.key.clone())
        })
        .collect()
}

/// Menu-builder dispatch table for filter editors. `None` for Date filters.
fn filter_editor(column: &Column, field_type: FieldType, items: &[Item]) -> Option<FilterEditor> {
    let combo_box = |free_form: bool| {
        let options = menu_options(items, column);
        FilterEditor::ComboBox {
            selected_keys: selected_keys(column, &options),
            options,
            free_form,
        }
    };

    match field_type {
        FieldType::Text => Some(FilterEditor::TextSearch),
        FieldType::Number => Some(FilterEditor::NumberSearch),
        FieldType::NumberRange => Some(FilterEditor::NumberRange {
            min: column
                .applied_filter(&FilterKey::min_value())
                .map(|af| af.filter_text.clone()),
            max: column
                .applied_filter(&FilterKey::max_value())
                .map(|af| af.filter_text.clone()),
        }),
        FieldType::Choice | FieldType::Time => Some(combo_box(false)),
        FieldType::PartialChoice => Some(combo_box(true)),
        FieldType::Date => None,
    }
}

fn applied_entries(column: &Column) -> Vec<AppliedFilterEntry> {
    let is_range = column.filter_field_type() == Some(FieldType::NumberRange);
    column
        .applied_filters()
        .iter()
        .map(|applied| {
            let label = match &applied.filter_key {
                key if is_range && key.is_min_value() => format!("Min : {}", applied.filter_text),
                key if is_range && key.is_max_value() => format!("Max : {}", applied.filter_text),
                _ => applied.filter_text.clone(),
            };
            AppliedFilterEntry {
                filter_key: applied.filter_key.clone(),
                label,
            }
        })
        .collect()
}

/// Builds the context menu of `column`.
///
/// ### Arguments
/// * `column`: Current runtime state of the column.
/// * `items`: The corpus, used to derive combo box options.
/// * `enable_filter`: Grid-wide switch for the filter section.
///
/// ### Returns
/// `None` when the column's menu affordance is disabled.
pub fn build_menu(column: &Column, items: &[Item], enable_filter: bool) -> Option<ColumnMenu> {
    if !column.menu_enabled {
        return None;
    }

    let filter = column
        .filter_details
        .as_ref()
        .filter(|details| enable_filter && details.filterable)
        .and_then(|details| filter_editor(column, details.field_type, items))
        .map(|editor| FilterMenu {
            editor,
            applied: applied_entries(column),
            clear_enabled: column.is_filtered(),
        });

    Some(ColumnMenu {
        field_name: column.field_name.clone(),
        sort_items: sort_menu_items(column),
        filter,
    })
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

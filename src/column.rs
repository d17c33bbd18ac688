//! Static column definitions and the mutable runtime column state built from them.
//!
//! `build_columns` is the only constructor of runtime state. Rebuilding on a
//! definition change discards every applied filter and the sort flag: it is a
//! reset, not a merge.

use crate::{ColumnType, FieldType, GridConfig, GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

// --- Constants ---

/// Filter key of the lower numeric bound.
pub const MIN_VALUE_KEY: &str = "minvalue";

/// Filter key of the upper numeric bound.
pub const MAX_VALUE_KEY: &str = "maxvalue";

/// Width used when a definition leaves a bound unset.
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;

// --- Definitions ---

/// Sort capability of a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortDetails {
    pub field_type: FieldType,
}

/// Filter capability of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDetails {
    pub field_type: FieldType,
    /// Explicit combo box options. When empty, options are derived from the items.
    #[serde(default)]
    pub filter_options: Vec<FilterOption>,
    #[serde(default = "default_true")]
    pub filterable: bool,
}

fn default_true() -> bool {
    true
}

/// Static, caller-supplied description of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    /// Unique key of the column and the item field it reads.
    pub field_name: String,
    pub display_name: String,
    #[serde(default)]
    pub min_width: Option<u32>,
    #[serde(default)]
    pub max_width: Option<u32>,
    #[serde(default)]
    pub is_icon_only: bool,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub disable_header_menu: bool,
    #[serde(default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub sort_details: Option<SortDetails>,
    #[serde(default)]
    pub filter_details: Option<FilterDetails>,
}

impl ColumnDefinition {
    pub fn new(field_name: &str, display_name: &str) -> Self {
        ColumnDefinition {
            field_name: field_name.to_string(),
            display_name: display_name.to_string(),
            min_width: None,
            max_width: None,
            is_icon_only: false,
            icon_name: None,
            disable_header_menu: false,
            column_type: ColumnType::Text,
            sort_details: None,
            filter_details: None,
        }
    }

    pub fn sortable(mut self, field_type: FieldType) -> Self {
        self.sort_details = Some(SortDetails { field_type });
        self
    }

    pub fn filterable(mut self, field_type: FieldType) -> Self {
        self.filter_details = Some(FilterDetails {
            field_type,
            filter_options: Vec::new(),
            filterable: true,
        });
        self
    }

    /// Supplies explicit combo box options. Has no effect without `filterable`.
    pub fn with_filter_options(mut self, options: Vec<FilterOption>) -> Self {
        if let Some(details) = self.filter_details.as_mut() {
            details.filter_options = options;
        }
        self
    }

    pub fn with_column_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    pub fn with_widths(mut self, min_width: u32, max_width: u32) -> Self {
        self.min_width = Some(min_width);
        self.max_width = Some(max_width);
        self
    }

    pub fn without_header_menu(mut self) -> Self {
        self.disable_header_menu = true;
        self
    }

    /// Parses a JSON array of definitions.
    pub fn list_from_json(json: &str) -> GridResult<Vec<ColumnDefinition>> {
        Ok(serde_json::from_str(json)?)
    }
}

// --- Filter values ---

/// Identity of an applied filter value.
///
/// Combo box options carry an ordinal (`Index`); free text and the numeric
/// bounds carry a name (`Name`, e.g. `minvalue`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterKey {
    Index(usize),
    Name(String),
}

impl FilterKey {
    pub fn min_value() -> Self {
        FilterKey::Name(MIN_VALUE_KEY.to_string())
    }

    pub fn max_value() -> Self {
        FilterKey::Name(MAX_VALUE_KEY.to_string())
    }

    pub fn is_min_value(&self) -> bool {
        matches!(self, FilterKey::Name(name) if name == MIN_VALUE_KEY)
    }

    pub fn is_max_value(&self) -> bool {
        matches!(self, FilterKey::Name(name) if name == MAX_VALUE_KEY)
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKey::Index(index) => write!(f, "{index}"),
            FilterKey::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<&str> for FilterKey {
    fn from(name: &str) -> Self {
        FilterKey::Name(name.to_string())
    }
}

impl From<usize> for FilterKey {
    fn from(index: usize) -> Self {
        FilterKey::Index(index)
    }
}

/// One concrete value a user has activated for a column's filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilter {
    pub filter_key: FilterKey,
    pub filter_text: String,
}

impl AppliedFilter {
    pub fn new(filter_key: impl Into<FilterKey>, filter_text: &str) -> Self {
        AppliedFilter {
            filter_key: filter_key.into(),
            filter_text: filter_text.to_string(),
        }
    }
}

/// One autocomplete / combo box entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub key: FilterKey,
    pub text: String,
}

impl FilterOption {
    pub fn new(key: impl Into<FilterKey>, text: &str) -> Self {
        FilterOption {
            key: key.into(),
            text: text.to_string(),
        }
    }
}

// --- Runtime state ---

/// Mutable runtime state of one column, keyed by `field_name`.
///
/// The sort and filter flags are only changed by the transitions in
/// `transition.rs`, which keep `is_filtered == !applied_filters.is_empty()`
/// and at most one sorted column across the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub field_name: String,
    pub name: String,
    pub min_width: u32,
    pub max_width: u32,
    pub is_icon_only: bool,
    pub icon_name: Option<String>,
    pub column_type: ColumnType,
    pub sort_details: Option<SortDetails>,
    pub filter_details: Option<FilterDetails>,
    pub date_format: String,
    pub time_format: String,
    /// Context-menu affordance: the header opens a sort/filter menu.
    pub menu_enabled: bool,

    pub(crate) is_sorted: bool,
    pub(crate) is_sorted_descending: bool,
    pub(crate) is_filtered: bool,
    pub(crate) applied_filters: Vec<AppliedFilter>,
}

impl Column {
    /// Builds the initial runtime state of one definition.
    fn from_definition(definition: &ColumnDefinition, config: &GridConfig) -> Self {
        let has_details = definition.sort_details.is_some() || definition.filter_details.is_some();

        Column {
            key: definition.field_name.clone(),
            field_name: definition.field_name.clone(),
            name: definition.display_name.clone(),
            min_width: definition.min_width.unwrap_or(DEFAULT_COLUMN_WIDTH),
            max_width: definition.max_width.unwrap_or(DEFAULT_COLUMN_WIDTH),
            is_icon_only: definition.is_icon_only,
            icon_name: definition.icon_name.clone(),
            column_type: definition.column_type,
            sort_details: definition.sort_details.clone(),
            filter_details: definition.filter_details.clone(),
            date_format: config.date_format.clone(),
            time_format: config.time_format.clone(),
            menu_enabled: has_details && !definition.disable_header_menu,
            is_sorted: false,
            is_sorted_descending: false,
            is_filtered: false,
            applied_filters: Vec::new(),
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    pub fn is_sorted_descending(&self) -> bool {
        self.is_sorted_descending
    }

    pub fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    pub fn applied_filters(&self) -> &[AppliedFilter] {
        &self.applied_filters
    }

    pub fn sort_field_type(&self) -> Option<FieldType> {
        self.sort_details.as_ref().map(|details| details.field_type)
    }

    pub fn filter_field_type(&self) -> Option<FieldType> {
        self.filter_details.as_ref().map(|details| details.field_type)
    }

    /// Filter transitions require filter details, the filterable flag and an
    /// enabled header menu.
    pub fn accepts_filters(&self) -> bool {
        self.menu_enabled
            && self
                .filter_details
                .as_ref()
                .is_some_and(|details| details.filterable)
    }

    /// Time matching applies to Time filter types and to Time-rendered columns.
    pub fn uses_time_matching(&self) -> bool {
        self.filter_field_type() == Some(FieldType::Time) || self.column_type == ColumnType::Time
    }

    pub fn applied_filter(&self, key: &FilterKey) -> Option<&AppliedFilter> {
        self.applied_filters
            .iter()
            .find(|applied| &applied.filter_key == key)
    }

    pub fn applied_texts(&self) -> Vec<&str> {
        self.applied_filters
            .iter()
            .map(|applied| applied.filter_text.as_str())
            .collect()
    }

    /// Replaces the applied filters and re-derives `is_filtered`.
    pub(crate) fn set_applied_filters(&mut self, applied_filters: Vec<AppliedFilter>) {
        self.is_filtered = !applied_filters.is_empty();
        self.applied_filters = applied_filters;
    }

    pub(crate) fn clear_filters(&mut self) {
        self.set_applied_filters(Vec::new());
    }

    pub(crate) fn set_sorted(&mut self, descending: bool) {
        self.is_sorted = true;
        self.is_sorted_descending = descending;
    }

    pub(crate) fn clear_sorted(&mut self) {
        self.is_sorted = false;
    }
}

/// Column Model Builder: converts static definitions into runtime state.
///
/// ### Arguments
/// * `definitions`: Ordered definitions; the output keeps this order (which is also on-screen order).
/// * `config`: Supplies the date and time display patterns copied into each column.
///
/// ### Returns
/// One unsorted, unfiltered `Column` per definition, or `GridError::DuplicateColumn`
/// if two definitions share a field name.
pub fn build_columns(
    definitions: &[ColumnDefinition],
    config: &GridConfig,
) -> GridResult<Vec<Column>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(definitions.len());

    for definition in definitions {
        if !seen.insert(definition.field_name.as_str()) {
            return Err(GridError::DuplicateColumn(definition.field_name.clone()));
        }
        columns.push(Column::from_definition(definition, config));
    }

    tracing::debug!("Built {} columns", columns.len());
    Ok(columns)
}

/// Finds a column by field name.
pub fn find_column<'a>(columns: &'a [Column], field_name: &str) -> GridResult<&'a Column> {
    columns
        .iter()
        .find(|column| column.field_name == field_name)
        .ok_or_else(|| GridError::UnknownColumn(field_name.to_string()))
}

/// The single sorted column, if any.
pub fn sorted_column(columns: &[Column]) -> Option<&Column> {
    columns.iter().find(|column| column.is_sorted)
}

/// Columns with at least one applied filter, in column order.
pub fn filtered_columns(columns: &[Column]) -> Vec<Column> {
    columns
        .iter()
        .filter(|column| column.is_filtered)
        .cloned()
        .collect()
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

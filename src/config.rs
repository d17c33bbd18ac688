use crate::{
    CheckboxVisibility, GridResult, LazyLoadDetails, SortDirection, validate_format,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

// --- Constants ---

/// Default display pattern for Date columns (chrono strftime).
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Default display pattern for Time columns (chrono strftime), e.g. `09:30 AM`.
pub const DEFAULT_TIME_FORMAT: &str = "%I:%M %p";

// --- Config Structs ---

/// Sort applied once at mount, replayed through the same transition as a user click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialSort {
    pub field_name: String,
    pub direction: SortDirection,
}

/// Filter values applied once at mount. Duplicates are dropped before replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialFilter {
    pub field_name: String,
    pub filter_values: Vec<String>,
}

/// Maps selected items to filter chips: `key_field` identifies the item,
/// `label_field` is the text shown on the chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterChipDetails {
    pub key_field: String,
    pub label_field: String,
}

/// Holds the host-supplied configuration of one grid instance.
///
/// Everything here is static for the lifetime of a mount: formats are copied
/// into each built column, the selection cap is handed to the selection
/// coordinator, and the initial sort/filters are replayed once by
/// `DetailsGrid::mount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    /// chrono strftime pattern used for Date columns.
    pub date_format: String,
    /// chrono strftime pattern used for Time columns (display, filters and options).
    pub time_format: String,
    /// Master switch for the filter section of every column menu.
    pub enable_filter: bool,
    pub checkbox_visibility: CheckboxVisibility,
    /// Selections above this count are rolled back. `None` means unlimited.
    pub max_selection_count: Option<usize>,
    pub initial_sort: Option<InitialSort>,
    pub initial_filters: Vec<InitialFilter>,
    pub filter_chip_details: Option<FilterChipDetails>,
    pub lazy_load: LazyLoadDetails,
}

impl Default for GridConfig {
    /// Creates default `GridConfig` with sensible initial values.
    fn default() -> Self {
        GridConfig {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            enable_filter: true,
            checkbox_visibility: CheckboxVisibility::default(),
            max_selection_count: None,
            initial_sort: None,
            initial_filters: Vec::new(),
            filter_chip_details: None,
            lazy_load: LazyLoadDetails::default(),
        }
    }
}

impl GridConfig {
    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> GridResult<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file from disk.
    pub fn from_path(path: &Path) -> GridResult<Self> {
        let json = fs::read_to_string(path)?;
        tracing::debug!("Read grid config from: {}", path.display());
        Self::from_json_str(&json)
    }

    /// Rejects date/time patterns chrono cannot render.
    pub fn validate(&self) -> GridResult<()> {
        validate_format(&self.date_format)?;
        validate_format(&self.time_format)?;
        Ok(())
    }

    pub fn with_initial_sort(mut self, field_name: &str, direction: SortDirection) -> Self {
        self.initial_sort = Some(InitialSort {
            field_name: field_name.to_string(),
            direction,
        });
        self
    }

    pub fn with_initial_filter(mut self, field_name: &str, values: &[&str]) -> Self {
        self.initial_filters.push(InitialFilter {
            field_name: field_name.to_string(),
            filter_values: values.iter().map(ToString::to_string).collect(),
        });
        self
    }

    pub fn with_max_selection_count(mut self, max: usize) -> Self {
        self.max_selection_count = Some(max);
        self
    }

    pub fn with_filter_chips(mut self, key_field: &str, label_field: &str) -> Self {
        self.filter_chip_details = Some(FilterChipDetails {
            key_field: key_field.to_string(),
            label_field: label_field.to_string(),
        });
        self
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

//! Closed enumerations shared by column definitions, the evaluators and the menu model.
//!
//! `FieldType` governs both comparison semantics (sort) and matching semantics (filter).
//! A column declares independent field types for sorting and filtering, so an `Amount`
//! column may sort as `Number` and filter as `NumberRange`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort and filter semantics of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Free text, matched case-insensitively by equality or substring.
    Text,
    /// A fixed list of values offered by the combo box.
    Choice,
    /// Like `Choice`, but the combo box also accepts free-form text.
    PartialChoice,
    /// Numeric values, filtered by `minvalue`/`maxvalue` bounds.
    Number,
    /// Numeric values, filtered by an ordered `[min, max]` pair.
    NumberRange,
    /// Calendar dates.
    Date,
    /// Times of day, compared by minutes since midnight.
    Time,
}

impl FieldType {
    /// Numeric field types evaluate filters as bounds instead of value lists.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::NumberRange)
    }

    /// Text-like field types share the case-insensitive contains-or-equals predicate.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Choice | FieldType::PartialChoice
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Requested sort direction for `choose_sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// `true` for `Desc`, matching the column's `is_sorted_descending` flag.
    pub fn is_descending(&self) -> bool {
        matches!(self, SortDirection::Desc)
    }

    /// Parses `asc`/`desc` (case-insensitive).
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Asc),
            "desc" | "descending" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// How a column's cells are rendered (and whether time matching applies).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    #[default]
    Text,
    Date,
    Time,
    Image,
}

/// Checkbox visibility of the row selection column.
/// Any value other than `Hidden` turns on multiple selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckboxVisibility {
    OnHover,
    Always,
    #[default]
    Hidden,
}

impl CheckboxVisibility {
    pub fn selection_enabled(&self) -> bool {
        !matches!(self, CheckboxVisibility::Hidden)
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

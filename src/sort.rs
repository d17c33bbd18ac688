//! Sort Evaluator and the header sort affordance.
//!
//! Sorting is single-column and stable: items comparing equal keep their incoming
//! relative order in both directions. The comparator is chosen by a dispatch table
//! over the column's sort `FieldType`.

use crate::{Column, FieldType, Item, Value};
use std::cmp::Ordering;

/// Signature of a sort-compare strategy.
type CompareFn = fn(&Value, &Value) -> Ordering;

/// Time fields compare by minutes since midnight; absent values count as -1.
fn compare_time_of_day(a: &Value, b: &Value) -> Ordering {
    a.minutes_since_midnight().cmp(&b.minutes_since_midnight())
}

/// Every other field type uses the default value ordering.
fn compare_default(a: &Value, b: &Value) -> Ordering {
    a.default_cmp(b)
}

/// Sort-compare dispatch table: FieldType -> comparator.
/// Columns without sort details fall back to the default ordering.
fn comparator_for(field_type: Option<FieldType>) -> CompareFn {
    match field_type {
        Some(FieldType::Time) => compare_time_of_day,
        Some(
            FieldType::Text
            | FieldType::Choice
            | FieldType::PartialChoice
            | FieldType::Number
            | FieldType::NumberRange
            | FieldType::Date,
        )
        | None => compare_default,
    }
}

/// Stable sort of `items` by `column.field_name`, ascending unless the column is
/// sorted descending.
///
/// ### Arguments
/// * `items`: Items to order (consumed and returned).
/// * `column`: Supplies the field, the direction flag and the sort field type.
///
/// ### Returns
/// The same items, totally ordered. Equal keys keep their incoming order.
pub fn sort_items(mut items: Vec<Item>, column: &Column) -> Vec<Item> {
    let compare = comparator_for(column.sort_field_type());
    let field = column.field_name.as_str();
    let descending = column.is_sorted_descending();

    // `sort_by` is stable; reversing the comparator (not the output) keeps ties in place.
    items.sort_by(|a, b| {
        let ordering = compare(a.get(field), b.get(field));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    tracing::debug!(
        "sort_items(): {} items by '{}' ({})",
        items.len(),
        field,
        if descending { "desc" } else { "asc" }
    );
    items
}

/// Represents the sort state of a column header, derived from the column flags.
///
/// Used by the rendering layer to draw the header arrow and by the menu builder
/// to check the matching sort entry.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SortState {
    /// Column is not the sort column.
    NotSorted,
    /// Column sorted ascending.
    Ascending,
    /// Column sorted descending.
    Descending,
}

impl SortState {
    pub fn of(column: &Column) -> Self {
        match (column.is_sorted(), column.is_sorted_descending()) {
            (false, _) => SortState::NotSorted,
            (true, false) => SortState::Ascending,
            (true, true) => SortState::Descending,
        }
    }

    /// Returns a Unicode icon visually representing the header state.
    ///
    /// ### Returns
    /// `"⏶"` ascending, `"⏷"` descending, `"↕"` when the column is not sorted.
    pub fn get_icon(&self) -> &'static str {
        match self {
            SortState::Ascending => "⏶",  // U+23F6 (Up arrow)
            SortState::Descending => "⏷", // U+23F7 (Down arrow)
            SortState::NotSorted => "↕",  // U+2195 UP DOWN ARROW
        }
    }
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_sort_items`
#[cfg(test)]
mod tests_sort_items {
    use super::*;
    use crate::{ColumnDefinition, GridConfig, GridResult, build_columns};
    use chrono::NaiveDate;

    fn sort_column(field: &str, field_type: FieldType, descending: bool) -> GridResult<Column> {
        let definition = ColumnDefinition::new(field, field).sortable(field_type);
        let mut column = build_columns(&[definition], &GridConfig::default())?.remove(0);
        column.set_sorted(descending);
        Ok(column)
    }

    fn ids(items: &[Item]) -> Vec<String> {
        items.iter().filter_map(|item| item.text("id")).collect()
    }

    fn amounts() -> Vec<Item> {
        vec![
            Item::new().with("id", "a").with("amount", 20.0),
            Item::new().with("id", "b").with("amount", 5.0),
            Item::new().with("id", "c").with("amount", 20.0),
            Item::new().with("id", "d").with("amount", 100.0),
            Item::new().with("id", "e"),
        ]
    }

    #[test]
    fn numbers_sort_numerically_with_missing_first() -> GridResult<()> {
        let sorted = sort_items(amounts(), &sort_column("amount", FieldType::Number, false)?);
        assert_eq!(ids(&sorted), vec!["e", "b", "a", "c", "d"]);
        Ok(())
    }

    #[test]
    fn descending_keeps_ties_in_original_order() -> GridResult<()> {
        let sorted = sort_items(amounts(), &sort_column("amount", FieldType::Number, true)?);
        // "a" and "c" tie on 20 and stay in incoming order.
        assert_eq!(ids(&sorted), vec!["d", "a", "c", "b", "e"]);
        Ok(())
    }

    #[test]
    fn sorting_twice_is_stable() -> GridResult<()> {
        let column = sort_column("amount", FieldType::Number, false)?;
        let once = sort_items(amounts(), &column);
        let twice = sort_items(once.clone(), &column);
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn text_sort_is_case_sensitive() -> GridResult<()> {
        let items = vec![
            Item::new().with("id", "banana"),
            Item::new().with("id", "Cherry"),
            Item::new().with("id", "apple"),
        ];
        let sorted = sort_items(items, &sort_column("id", FieldType::Text, false)?);
        assert_eq!(ids(&sorted), vec!["Cherry", "apple", "banana"]);
        Ok(())
    }

    #[test]
    fn time_sorts_by_time_of_day_ignoring_date() -> GridResult<()> {
        let at = |day, hour, minute| {
            NaiveDate::from_ymd_opt(2024, 1, day).and_then(|d| d.and_hms_opt(hour, minute, 0))
        };
        let items = vec![
            Item::new().with("id", "late").with("start", at(1, 18, 0)),
            Item::new().with("id", "early-next-day").with("start", at(9, 7, 15)),
            Item::new().with("id", "none"),
            Item::new().with("id", "noon").with("start", at(3, 12, 0)),
        ];
        let sorted = sort_items(items, &sort_column("start", FieldType::Time, false)?);
        assert_eq!(ids(&sorted), vec!["none", "early-next-day", "noon", "late"]);
        Ok(())
    }

    #[test]
    fn header_state_and_icon() -> GridResult<()> {
        let descending = sort_column("amount", FieldType::Number, true)?;
        assert_eq!(SortState::of(&descending), SortState::Descending);
        assert_eq!(SortState::of(&descending).get_icon(), "⏷");

        let mut unsorted = descending.clone();
        unsorted.clear_sorted();
        assert_eq!(SortState::of(&unsorted), SortState::NotSorted);
        assert_eq!(SortState::NotSorted.get_icon(), "↕");
        Ok(())
    }
}

//! Option Deriver: distinct-value autocomplete lists per column.
//!
//! Options are always derived from the corpus (all items), never from the
//! displayed set, so narrowing one column does not hide values of another.

use crate::{Column, FilterOption, Item, UniqueElements, Value};

/// Option-builder strategy, picked per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionStrategy {
    /// Sort by time of day, format, then de-duplicate by formatted text.
    TimeOfDay,
    /// De-duplicate by raw value in corpus order.
    RawValue,
}

impl OptionStrategy {
    fn for_column(column: &Column) -> Self {
        if column.uses_time_matching() {
            OptionStrategy::TimeOfDay
        } else {
            OptionStrategy::RawValue
        }
    }
}

/// Computes the distinct options of `column` over `items`.
///
/// ### Arguments
/// * `items`: The corpus.
/// * `column`: Supplies the field name and, for time columns, the time format.
/// * `partial_text`: When given, keeps only options whose text contains it,
///   ignoring case.
///
/// ### Returns
/// Options keyed by a 1-based ordinal. Time options keep time-of-day order and
/// collapse raw values that format to the same text.
///
/// ### Logic
/// * Time: order values by minutes since midnight (stable), number them, format
///   with `time_format` and keep the first option of each formatted text.
/// * Others: keep the first occurrence of each raw value, then number them.
/// * Null values never produce an option.
pub fn derive_options(
    items: &[Item],
    column: &Column,
    partial_text: Option<&str>,
) -> Vec<FilterOption> {
    let field = column.field_name.as_str();

    let mut options: Vec<FilterOption> = match OptionStrategy::for_column(column) {
        OptionStrategy::TimeOfDay => {
            let mut values: Vec<&Value> = items.iter().map(|item| item.get(field)).collect();
            values.sort_by_key(|value| value.minutes_since_midnight());

            let mut options: Vec<FilterOption> = values
                .iter()
                .enumerate()
                .filter_map(|(index, value)| {
                    value
                        .format_datetime(&column.time_format)
                        .map(|text| FilterOption::new(index + 1, &text))
                })
                .collect();
            options.unique_by(|option| option.text.clone());
            options
        }
        OptionStrategy::RawValue => {
            let mut values: Vec<&Value> = items
                .iter()
                .map(|item| item.get(field))
                .filter(|value| !value.is_null())
                .collect();
            values.unique_by(|value| value.raw_key());

            values
                .iter()
                .enumerate()
                .filter_map(|(index, value)| {
                    value
                        .as_text()
                        .map(|text| FilterOption::new(index + 1, &text))
                })
                .collect()
        }
    };

    if let Some(partial) = partial_text.map(str::to_lowercase) {
        options.retain(|option| option.text.to_lowercase().contains(&partial));
    }

    tracing::trace!("derive_options(): '{}' -> {} options", field, options.len());
    options
}

/// Options offered by the column menu's combo box.
///
/// Explicit `filterOptions` win. Otherwise the derived options are used, sorted
/// case-insensitively by text except for time columns, which stay in time order.
pub fn menu_options(items: &[Item], column: &Column) -> Vec<FilterOption> {
    if let Some(details) = column.filter_details.as_ref()
        && !details.filter_options.is_empty()
    {
        return details.filter_options.clone();
    }

    let mut options = derive_options(items, column, None);
    if OptionStrategy::for_column(column) == OptionStrategy::RawValue {
        options.sort_by_cached_key(|option| option.text.to_lowercase());
    }
    options
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_derive_options`
#[cfg(test)]
mod tests_derive_options {
    use super::*;
    use crate::{
        ColumnDefinition, ColumnType, FieldType, FilterKey, GridConfig, GridResult, build_columns,
    };
    use chrono::{NaiveDate, NaiveDateTime};

    fn only_column(definition: ColumnDefinition) -> GridResult<Column> {
        Ok(build_columns(&[definition], &GridConfig::default())?.remove(0))
    }

    fn texts(options: &[FilterOption]) -> Vec<&str> {
        options.iter().map(|option| option.text.as_str()).collect()
    }

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 6, day).and_then(|d| d.and_hms_opt(hour, minute, second))
    }

    #[test]
    fn raw_values_are_deduplicated_in_corpus_order() -> GridResult<()> {
        let column = only_column(ColumnDefinition::new("city", "City").filterable(FieldType::Choice))?;
        let items: Vec<Item> = ["Lisbon", "Porto", "Lisbon", "Braga"]
            .iter()
            .map(|city| Item::new().with("city", *city))
            .chain(std::iter::once(Item::new()))
            .collect();

        let options = derive_options(&items, &column, None);
        assert_eq!(texts(&options), vec!["Lisbon", "Porto", "Braga"]);

        let keys: Vec<FilterKey> = options.iter().map(|o| o.key.clone()).collect();
        assert_eq!(keys, vec![FilterKey::Index(1), FilterKey::Index(2), FilterKey::Index(3)]);
        Ok(())
    }

    #[test]
    fn times_that_format_identically_collapse_to_one_option() -> GridResult<()> {
        let column = only_column(
            ColumnDefinition::new("start", "Start")
                .filterable(FieldType::Time)
                .with_column_type(ColumnType::Time),
        )?;
        let items = vec![
            Item::new().with("start", at(3, 14, 5, 0)),
            // Same minute, different second and day.
            Item::new().with("start", at(9, 14, 5, 42)),
            Item::new().with("start", at(1, 8, 0, 0)),
            Item::new(),
        ];

        let options = derive_options(&items, &column, None);
        assert_eq!(texts(&options), vec!["08:00 AM", "02:05 PM"]);
        assert!(options.iter().all(|o| o.key != FilterKey::Index(0)));
        Ok(())
    }

    #[test]
    fn partial_text_narrows_case_insensitively() -> GridResult<()> {
        let column = only_column(
            ColumnDefinition::new("name", "Name").filterable(FieldType::PartialChoice),
        )?;
        let items: Vec<Item> = ["Marta", "MARIO", "Ana"]
            .iter()
            .map(|name| Item::new().with("name", *name))
            .collect();

        let options = derive_options(&items, &column, Some("mar"));
        assert_eq!(texts(&options), vec!["Marta", "MARIO"]);
        Ok(())
    }

    #[test]
    fn menu_prefers_explicit_options_and_sorts_derived_ones() -> GridResult<()> {
        let items: Vec<Item> = ["pear", "Apple", "banana"]
            .iter()
            .map(|fruit| Item::new().with("fruit", *fruit))
            .collect();

        let derived = only_column(ColumnDefinition::new("fruit", "Fruit").filterable(FieldType::Choice))?;
        assert_eq!(texts(&menu_options(&items, &derived)), vec!["Apple", "banana", "pear"]);

        let explicit = only_column(
            ColumnDefinition::new("fruit", "Fruit")
                .filterable(FieldType::Choice)
                .with_filter_options(vec![FilterOption::new("citrus", "Citrus")]),
        )?;
        assert_eq!(texts(&menu_options(&items, &explicit)), vec!["Citrus"]);
        Ok(())
    }
}

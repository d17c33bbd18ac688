//! Predicate Evaluator: narrows an item set by the applied filters of the active columns.
//!
//! Columns combine with logical AND, applied values within a column with logical OR,
//! except numeric bounds which combine `(no min or value >= min) AND (no max or value <= max)`.
//! Each column's predicate is compiled once per evaluation by a dispatch table over
//! its filter `FieldType`, then run against every remaining candidate.

use crate::{Column, FieldType, FilterKey, Item, Value, parse_number};

/// Compiled per-column predicate.
#[derive(Debug, Clone, PartialEq)]
enum ColumnPredicate {
    /// No effective filter on this column.
    PassAll,
    /// Case-insensitive equality or substring against lowercased needles.
    Text { needles: Vec<String> },
    /// Case-sensitive equality of the value formatted with `pattern` (Time, Date).
    Formatted { pattern: String, texts: Vec<String> },
    /// Inclusive numeric bounds; an unparseable bound is treated as absent.
    Bounds { min: Option<f64>, max: Option<f64> },
}

impl ColumnPredicate {
    /// Filter-match dispatch table: FieldType -> predicate strategy.
    fn for_column(column: &Column) -> Self {
        if column.applied_filters().is_empty() {
            return ColumnPredicate::PassAll;
        }

        let texts = || -> Vec<String> {
            column
                .applied_texts()
                .into_iter()
                .map(ToString::to_string)
                .collect()
        };

        match column.filter_field_type() {
            Some(field_type) if field_type.is_numeric() => {
                let bound = |key: FilterKey| {
                    column
                        .applied_filter(&key)
                        .and_then(|applied| parse_number(&applied.filter_text))
                };
                let min = bound(FilterKey::min_value());
                let max = bound(FilterKey::max_value());
                if min.is_none() && max.is_none() {
                    ColumnPredicate::PassAll
                } else {
                    ColumnPredicate::Bounds { min, max }
                }
            }
            Some(FieldType::Date) => ColumnPredicate::Formatted {
                pattern: column.date_format.clone(),
                texts: texts(),
            },
            Some(_) if column.uses_time_matching() => ColumnPredicate::Formatted {
                pattern: column.time_format.clone(),
                texts: texts(),
            },
            Some(field_type) if field_type.is_text_like() => ColumnPredicate::Text {
                needles: texts().iter().map(|text| text.to_lowercase()).collect(),
            },
            Some(_) | None => ColumnPredicate::PassAll,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ColumnPredicate::PassAll => true,
            // Blank values only match an explicit blank filter.
            ColumnPredicate::Text { needles } if value.is_blank() => {
                needles.iter().any(String::is_empty)
            }
            ColumnPredicate::Text { needles } => {
                let haystack = value.as_text().unwrap_or_default().to_lowercase();
                needles.iter().any(|needle| {
                    haystack == *needle || (!needle.is_empty() && haystack.contains(needle))
                })
            }
            ColumnPredicate::Formatted { pattern, texts } => value
                .format_datetime(pattern)
                .is_some_and(|formatted| texts.iter().any(|text| *text == formatted)),
            ColumnPredicate::Bounds { min, max } => value.as_f64().is_some_and(|number| {
                min.is_none_or(|min| number >= min) && max.is_none_or(|max| number <= max)
            }),
        }
    }
}

/// Returns the subset of `items` matching every filtered column.
///
/// ### Arguments
/// * `items`: Candidate items, in the order they should be kept.
/// * `filtered_columns`: Columns whose applied filters narrow the set. Columns without
///   applied filters pass every item.
///
/// ### Returns
/// The surviving items in their original relative order. The result does not depend
/// on the order of `filtered_columns`.
pub fn filter_items(mut items: Vec<Item>, filtered_columns: &[Column]) -> Vec<Item> {
    let before = items.len();

    for column in filtered_columns {
        let predicate = ColumnPredicate::for_column(column);
        if predicate == ColumnPredicate::PassAll {
            continue;
        }
        items.retain(|item| predicate.matches(item.get(&column.field_name)));
        tracing::trace!(
            "Filter on '{}' kept {} items",
            column.field_name,
            items.len()
        );
    }

    tracing::debug!(
        "filter_items(): {} -> {} items across {} columns",
        before,
        items.len(),
        filtered_columns.len()
    );
    items
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_filter_items`
#[cfg(test)]
mod tests_filter_items {
    use super::*;
    use crate::{
        AppliedFilter, ColumnDefinition, ColumnType, GridConfig, GridResult, build_columns,
    };
    use chrono::NaiveDate;

    fn column(definition: ColumnDefinition, applied: Vec<AppliedFilter>) -> GridResult<Column> {
        let mut columns = build_columns(&[definition], &GridConfig::default())?;
        let mut column = columns.remove(0);
        column.set_applied_filters(applied);
        Ok(column)
    }

    fn text_column(field: &str, values: &[&str]) -> GridResult<Column> {
        column(
            ColumnDefinition::new(field, field).filterable(FieldType::Text),
            values.iter().map(|v| AppliedFilter::new(*v, v)).collect(),
        )
    }

    fn titles(items: &[Item]) -> Vec<String> {
        items.iter().filter_map(|item| item.text("title")).collect()
    }

    fn titled(values: &[&str]) -> Vec<Item> {
        values.iter().map(|v| Item::new().with("title", *v)).collect()
    }

    #[test]
    fn text_is_case_insensitive_equals_or_contains() -> GridResult<()> {
        let items = titled(&["AB", "abc", "xab", "xyz"]);
        let filtered = filter_items(items, &[text_column("title", &["ab"])?]);
        assert_eq!(titles(&filtered), vec!["AB", "abc", "xab"]);
        Ok(())
    }

    #[test]
    fn values_within_a_column_are_ored() -> GridResult<()> {
        let items = titled(&["apple", "banana", "cherry"]);
        let filtered = filter_items(items, &[text_column("title", &["APP", "cher"])?]);
        assert_eq!(titles(&filtered), vec!["apple", "cherry"]);
        Ok(())
    }

    #[test]
    fn null_values_only_match_blank_filter() -> GridResult<()> {
        let items = vec![
            Item::new().with("title", "alpha"),
            Item::new().with("title", Value::Null),
            Item::new(),
            Item::new().with("title", ""),
        ];

        let non_blank = filter_items(items.clone(), &[text_column("title", &["a"])?]);
        assert_eq!(non_blank.len(), 1);

        let blank = filter_items(items, &[text_column("title", &[""])?]);
        assert_eq!(blank.len(), 3);
        Ok(())
    }

    #[test]
    fn text_filter_reads_numbers_as_text() -> GridResult<()> {
        let items = vec![
            Item::new().with("code", 1042),
            Item::new().with("code", 77),
        ];
        let filtered = filter_items(items, &[text_column("code", &["04"])?]);
        assert_eq!(filtered.len(), 1);
        Ok(())
    }

    #[test]
    fn filtering_is_idempotent() -> GridResult<()> {
        let columns = [text_column("title", &["a"])?];
        let once = filter_items(titled(&["alpha", "beta", "gamma", "xyz"]), &columns);
        let twice = filter_items(once.clone(), &columns);
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn column_order_does_not_change_the_result() -> GridResult<()> {
        let items = vec![
            Item::new().with("title", "red car").with("kind", "toy"),
            Item::new().with("title", "red bike").with("kind", "sport"),
            Item::new().with("title", "blue car").with("kind", "toy"),
        ];
        let title = text_column("title", &["red"])?;
        let kind = text_column("kind", &["toy"])?;

        let forward = filter_items(items.clone(), &[title.clone(), kind.clone()]);
        let backward = filter_items(items, &[kind, title]);
        assert_eq!(forward, backward);
        assert_eq!(titles(&forward), vec!["red car"]);
        Ok(())
    }

    fn amounts(values: &[f64]) -> Vec<Item> {
        values.iter().map(|v| Item::new().with("amount", *v)).collect()
    }

    fn amount_values(items: &[Item]) -> Vec<f64> {
        items.iter().filter_map(|item| item.get("amount").as_f64()).collect()
    }

    fn bounds_column(field_type: FieldType, applied: Vec<AppliedFilter>) -> GridResult<Column> {
        column(
            ColumnDefinition::new("amount", "Amount").filterable(field_type),
            applied,
        )
    }

    #[test]
    fn number_min_bound_is_inclusive() -> GridResult<()> {
        let column = bounds_column(
            FieldType::Number,
            vec![AppliedFilter::new(FilterKey::min_value(), "10")],
        )?;
        let filtered = filter_items(amounts(&[9.0, 10.0, 11.0]), &[column]);
        assert_eq!(amount_values(&filtered), vec![10.0, 11.0]);
        Ok(())
    }

    #[test]
    fn number_range_with_equal_bounds() -> GridResult<()> {
        let column = bounds_column(
            FieldType::NumberRange,
            vec![
                AppliedFilter::new(FilterKey::min_value(), "5"),
                AppliedFilter::new(FilterKey::max_value(), "5"),
            ],
        )?;
        let filtered = filter_items(amounts(&[4.0, 5.0, 6.0]), &[column]);
        assert_eq!(amount_values(&filtered), vec![5.0]);
        Ok(())
    }

    #[test]
    fn unparseable_bound_is_ignored() -> GridResult<()> {
        let column = bounds_column(
            FieldType::NumberRange,
            vec![
                AppliedFilter::new(FilterKey::min_value(), "abc"),
                AppliedFilter::new(FilterKey::max_value(), "20"),
            ],
        )?;
        let filtered = filter_items(amounts(&[-3.0, 20.0, 21.0]), &[column]);
        assert_eq!(amount_values(&filtered), vec![-3.0, 20.0]);
        Ok(())
    }

    #[test]
    fn missing_numeric_value_is_excluded_by_bounds() -> GridResult<()> {
        let column = bounds_column(
            FieldType::Number,
            vec![AppliedFilter::new(FilterKey::max_value(), "100")],
        )?;
        let items = vec![Item::new(), Item::new().with("amount", "50")];
        let filtered = filter_items(items, &[column]);
        assert_eq!(amount_values(&filtered), vec![50.0]);
        Ok(())
    }

    #[test]
    fn time_matches_formatted_text_exactly() -> GridResult<()> {
        let at = |hour, minute| {
            NaiveDate::from_ymd_opt(2024, 5, 1).and_then(|d| d.and_hms_opt(hour, minute, 0))
        };
        let items = vec![
            Item::new().with("start", at(9, 30)),
            Item::new().with("start", at(21, 30)),
            Item::new().with("start", at(9, 30).map(|t| t + chrono::Duration::days(3))),
        ];
        let column = column(
            ColumnDefinition::new("start", "Start")
                .filterable(FieldType::Choice)
                .with_column_type(ColumnType::Time),
            vec![AppliedFilter::new(1usize, "09:30 AM")],
        )?;

        let filtered = filter_items(items, &[column]);
        assert_eq!(filtered.len(), 2);

        // Case-sensitive: a lowercase meridiem never matches.
        let lowercase = self::column(
            ColumnDefinition::new("start", "Start").filterable(FieldType::Time),
            vec![AppliedFilter::new(1usize, "09:30 am")],
        )?;
        let none = filter_items(vec![Item::new().with("start", at(9, 30))], &[lowercase]);
        assert!(none.is_empty());
        Ok(())
    }

    #[test]
    fn date_matches_text_formatted_with_date_format() -> GridResult<()> {
        let on = |month, day, hour| {
            NaiveDate::from_ymd_opt(2024, month, day).and_then(|d| d.and_hms_opt(hour, 0, 0))
        };
        let items = vec![
            Item::new().with("title", "morning").with("due", on(3, 7, 8)),
            Item::new().with("title", "evening").with("due", on(3, 7, 20)),
            Item::new().with("title", "later").with("due", on(7, 3, 8)),
            Item::new().with("title", "text").with("due", "2024-03-07"),
            Item::new().with("title", "missing"),
        ];
        let column = column(
            ColumnDefinition::new("due", "Due")
                .filterable(FieldType::Date)
                .with_column_type(ColumnType::Date),
            vec![AppliedFilter::new("03/07/2024", "03/07/2024")],
        )?;

        // Time of day is ignored; the default date format is month first.
        let filtered = filter_items(items, &[column]);
        assert_eq!(titles(&filtered), vec!["morning", "evening", "text"]);
        Ok(())
    }

    #[test]
    fn column_without_applied_filters_passes_everything() -> GridResult<()> {
        let column = text_column("title", &[])?;
        let items = titled(&["a", "b"]);
        assert_eq!(filter_items(items.clone(), &[column]), items);
        Ok(())
    }
}

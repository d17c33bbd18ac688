use crate::{Column, ColumnType, Item};

/// Default text of one cell.
///
/// Date and Time columns render with the column's date/time pattern; values that
/// cannot be read as a date-time fall back to their plain text. Image columns
/// render the raw source string. Null renders empty.
pub fn format_cell(item: &Item, column: &Column) -> String {
    let value = item.get(&column.field_name);

    let formatted = match column.column_type {
        ColumnType::Date => value.format_datetime(&column.date_format),
        ColumnType::Time => value.format_datetime(&column.time_format),
        ColumnType::Text | ColumnType::Image => None,
    };

    formatted.or_else(|| value.as_text()).unwrap_or_default()
}

/// Formats a whole row in column order.
pub fn format_row(item: &Item, columns: &[Column]) -> Vec<String> {
    columns.iter().map(|column| format_cell(item, column)).collect()
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_format_cell`
#[cfg(test)]
mod tests_format_cell {
    use super::*;
    use crate::{ColumnDefinition, GridConfig, GridResult, build_columns};
    use chrono::NaiveDate;

    fn columns() -> GridResult<Vec<Column>> {
        build_columns(
            &[
                ColumnDefinition::new("title", "Title"),
                ColumnDefinition::new("due", "Due").with_column_type(ColumnType::Date),
                ColumnDefinition::new("start", "Start").with_column_type(ColumnType::Time),
                ColumnDefinition::new("photo", "Photo").with_column_type(ColumnType::Image),
                ColumnDefinition::new("amount", "Amount"),
            ],
            &GridConfig::default(),
        )
    }

    #[test]
    fn formats_by_column_type() -> GridResult<()> {
        let when = NaiveDate::from_ymd_opt(2024, 2, 9).and_then(|d| d.and_hms_opt(16, 45, 0));
        let item = Item::new()
            .with("title", "Report")
            .with("due", when)
            .with("start", "2024-02-09 08:05:00")
            .with("photo", "https://example.com/p.png")
            .with("amount", 12.5);

        assert_eq!(
            format_row(&item, &columns()?),
            vec!["Report", "02/09/2024", "08:05 AM", "https://example.com/p.png", "12.5"]
        );
        Ok(())
    }

    #[test]
    fn null_and_unparseable_values() -> GridResult<()> {
        let item = Item::new().with("due", "someday");
        let row = format_row(&item, &columns()?);
        assert_eq!(row[0], "");
        assert_eq!(row[1], "someday");
        Ok(())
    }
}

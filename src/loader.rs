//! Data-file loading for the command-line host: file -> polars `DataFrame` -> `Item`s.
//!
//! Reads run on a tokio blocking thread. CSV files are retried with common delimiters
//! when the configured one yields a single column.

use crate::{
    ColumnDefinition, ColumnType, FieldType, FileExtension, GridError, GridResult, Item,
    UniqueElements, Value, parse_datetime, parse_number,
};
use polars::prelude::*;
use std::{
    fmt::Debug,
    fs::File,
    num::NonZero,
    path::{Path, PathBuf},
};
use tokio::task::spawn_blocking;

// --- Constants ---

/// Default delimiter used for CSV parsing if not specified.
pub static DEFAULT_CSV_DELIMITER: &str = ";";

/// Default number of rows used to infer the schema.
pub const DEFAULT_INFER_SCHEMA_ROWS: usize = 200;

/// Rows read when probing a CSV delimiter.
const NROWS_CHECK: usize = 100;

/// Where and how to read the data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSource {
    pub absolute_path: PathBuf,
    pub csv_delimiter: String,
    pub infer_schema_rows: usize,
}

impl DataSource {
    /// Resolves `path` to an absolute path.
    ///
    /// ### Errors
    /// `FileNotFound` if the path does not exist.
    pub fn new(path: &Path) -> GridResult<Self> {
        let absolute_path = path
            .canonicalize()
            .map_err(|_| GridError::FileNotFound(path.to_path_buf()))?;

        Ok(DataSource {
            absolute_path,
            csv_delimiter: DEFAULT_CSV_DELIMITER.to_string(),
            infer_schema_rows: DEFAULT_INFER_SCHEMA_ROWS,
        })
    }

    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.csv_delimiter = delimiter.to_string();
        self
    }

    /// Reads the file according to its extension.
    ///
    /// For CSV, `csv_delimiter` is updated to the delimiter that actually worked.
    pub async fn load_dataframe(&mut self) -> GridResult<DataFrame> {
        let extension = FileExtension::from_path(&self.absolute_path);

        let df = match &extension {
            FileExtension::Csv => self.read_csv_data().await?,
            FileExtension::Json => self.read_json_data().await?,
            FileExtension::NDJson => self.read_ndjson_data().await?,
            FileExtension::Parquet => self.read_parquet_data().await?,
            FileExtension::Unknown(_) | FileExtension::Missing => {
                return Err(extension.unsupported(&self.absolute_path));
            }
        };

        tracing::debug!(
            "load_dataframe(): {:?} shape {:?} from {}",
            extension,
            df.shape(),
            self.absolute_path.display()
        );
        Ok(df)
    }

    /// Reads the file and converts every row into an `Item`.
    pub async fn load_items(&mut self) -> GridResult<(Vec<Item>, Vec<ColumnDefinition>)> {
        let df = self.load_dataframe().await?;
        let items = dataframe_to_items(&df)?;
        Ok((items, infer_column_definitions(&df)))
    }

    async fn read_json_data(&self) -> GridResult<DataFrame> {
        let file = File::open(&self.absolute_path)?;
        let infer_schema_rows = self.infer_schema_rows;

        execute_polars_blocking(move || {
            JsonReader::new(file)
                .infer_schema_len(NonZero::new(infer_schema_rows))
                .finish()
        })
        .await
    }

    async fn read_ndjson_data(&self) -> GridResult<DataFrame> {
        let path = PlRefPath::try_from_path(&self.absolute_path)?;
        let infer_schema_rows = self.infer_schema_rows;

        execute_polars_blocking(move || {
            LazyJsonLineReader::new(path)
                .low_memory(false)
                .with_infer_schema_length(NonZero::new(infer_schema_rows))
                .with_ignore_errors(true)
                .finish()?
                .with_new_streaming(true)
                .collect()
        })
        .await
    }

    async fn read_parquet_data(&self) -> GridResult<DataFrame> {
        let path = PlRefPath::try_from_path(&self.absolute_path)?;
        let args = ScanArgsParquet {
            low_memory: false,
            ..Default::default()
        };

        execute_polars_blocking(move || {
            LazyFrame::scan_parquet(path, args)?
                .with_new_streaming(true)
                .collect()
        })
        .await
    }

    /// Tries the configured delimiter first, then the common ones. A delimiter is
    /// accepted when the probe finds more than one column (or it is the last candidate).
    async fn read_csv_data(&mut self) -> GridResult<DataFrame> {
        let configured = self
            .csv_delimiter
            .as_bytes()
            .first()
            .copied()
            .ok_or_else(|| GridError::InvalidDelimiter(self.csv_delimiter.clone()))?;

        let mut delimiters = vec![configured, b',', b';', b'|', b'\t'];
        delimiters.unique();

        for (position, &delimiter) in delimiters.iter().enumerate() {
            let is_last = position + 1 == delimiters.len();

            let probe = self.read_csv_with(delimiter, Some(NROWS_CHECK)).await;
            match probe {
                Ok(df) if df.width() > 1 || is_last => {
                    let df = self.read_csv_with(delimiter, None).await?;
                    self.csv_delimiter = (delimiter as char).to_string();
                    tracing::info!("Read CSV with delimiter '{}'", delimiter as char);
                    return Ok(df);
                }
                Ok(_) => tracing::trace!("Delimiter '{}' gives one column", delimiter as char),
                Err(error) => {
                    tracing::warn!("CSV probe with '{}' failed: {}", delimiter as char, error)
                }
            }
        }

        let error = GridError::CsvParsing(format!(
            "Failed to read CSV '{}' with common delimiters.",
            self.absolute_path.display()
        ));
        tracing::error!("{}", error);
        Err(error)
    }

    async fn read_csv_with(&self, delimiter: u8, n_rows: Option<usize>) -> GridResult<DataFrame> {
        let path = PlRefPath::try_from_path(&self.absolute_path)?;
        let infer_schema_rows = self.infer_schema_rows;

        execute_polars_blocking(move || {
            LazyCsvReader::new(path)
                .with_encoding(CsvEncoding::LossyUtf8)
                .with_has_header(true)
                .with_try_parse_dates(true)
                .with_separator(delimiter)
                .with_infer_schema_length(Some(infer_schema_rows))
                .with_ignore_errors(true)
                .with_missing_is_null(true)
                .with_n_rows(n_rows)
                .finish()?
                .with_new_streaming(true)
                .collect()
        })
        .await
    }
}

/// Converts a `DataFrame` into items, one per row.
///
/// ### Logic
/// Every column is cast to String and each cell is re-typed from the column's
/// original dtype: integers and floats become `Value::Number`, dates and datetimes
/// `Value::DateTime`, booleans `Value::Bool`, everything else `Value::Text`.
/// Nulls stay `Value::Null`.
pub fn dataframe_to_items(df: &DataFrame) -> GridResult<Vec<Item>> {
    let mut items = vec![Item::new(); df.height()];

    for column in df.columns() {
        let name = column.name().to_string();
        let dtype = column.dtype().clone();
        let as_text = column.cast(&DataType::String)?;

        for (row, item) in items.iter_mut().enumerate() {
            let value = match as_text.get(row)? {
                AnyValue::String(text) => typed_value(&dtype, text),
                AnyValue::StringOwned(text) => typed_value(&dtype, text.as_str()),
                _ => Value::Null,
            };
            item.insert(name.clone(), value);
        }
    }

    tracing::debug!("dataframe_to_items(): {} items", items.len());
    Ok(items)
}

fn typed_value(dtype: &DataType, text: &str) -> Value {
    let typed = match dtype {
        dtype if dtype.is_float() || dtype.is_integer() => parse_number(text).map(Value::Number),
        DataType::Date | DataType::Datetime(_, _) => parse_datetime(text).map(Value::DateTime),
        DataType::Boolean => Some(Value::Bool(text == "true")),
        _ => None,
    };
    typed.unwrap_or_else(|| Value::from(text))
}

/// Column definitions inferred from the schema, in frame order.
///
/// Numbers sort as Number and filter by range, dates sort as Date and render with
/// the date format, booleans filter by choice, anything else is free text.
pub fn infer_column_definitions(df: &DataFrame) -> Vec<ColumnDefinition> {
    df.columns()
        .iter()
        .map(|column| {
            let name = column.name().as_str();
            let definition = ColumnDefinition::new(name, name);
            match column.dtype() {
                dtype if dtype.is_float() || dtype.is_integer() => definition
                    .sortable(FieldType::Number)
                    .filterable(FieldType::NumberRange),
                DataType::Date | DataType::Datetime(_, _) => definition
                    .sortable(FieldType::Date)
                    .with_column_type(ColumnType::Date),
                DataType::Boolean => definition
                    .sortable(FieldType::Text)
                    .filterable(FieldType::Choice),
                _ => definition
                    .sortable(FieldType::Text)
                    .filterable(FieldType::Text),
            }
        })
        .collect()
}

/// Runs a blocking polars operation on tokio's blocking pool and maps both the
/// join error and the polars error into `GridError`.
async fn execute_polars_blocking<T, F>(op: F) -> GridResult<T>
where
    F: FnOnce() -> Result<T, PolarsError> + Send + 'static,
    T: Debug + Send + 'static,
{
    let polars_result = spawn_blocking(op).await?;
    Ok(polars_result?)
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

/// Run tests with:
/// `cargo test -- --show-output tests_loader`
#[cfg(test)]
mod tests_loader {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn write_temp(content: &str, suffix: &str) -> GridResult<NamedTempFile> {
        let mut temp_file = Builder::new().suffix(suffix).tempfile()?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.flush()?;
        Ok(temp_file)
    }

    #[tokio::test]
    async fn csv_rows_become_typed_items() -> GridResult<()> {
        let csv = "\
title;amount;due
Alpha;10.5;2024-01-15
Beta;3;2024-02-01
Gamma;;2024-03-20";
        let temp_file = write_temp(csv, ".csv")?;

        let mut source = DataSource::new(temp_file.path())?;
        let (items, definitions) = source.load_items().await?;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].get("title"), &Value::from("Alpha"));
        assert_eq!(items[1].get("amount").as_f64(), Some(3.0));
        assert!(items[2].get("amount").is_null());
        assert!(items[0].get("due").as_datetime().is_some());

        let fields: Vec<&str> = definitions.iter().map(|d| d.field_name.as_str()).collect();
        assert_eq!(fields, vec!["title", "amount", "due"]);
        assert_eq!(
            definitions[1].filter_details.as_ref().map(|d| d.field_type),
            Some(FieldType::NumberRange)
        );
        Ok(())
    }

    #[tokio::test]
    async fn csv_delimiter_is_detected() -> GridResult<()> {
        let temp_file = write_temp("name,score\nana,7\nrui,9\n", ".csv")?;

        let mut source = DataSource::new(temp_file.path())?.with_delimiter(";");
        let df = source.load_dataframe().await?;

        assert_eq!(df.width(), 2);
        assert_eq!(source.csv_delimiter, ",");
        Ok(())
    }

    #[tokio::test]
    async fn ndjson_is_supported() -> GridResult<()> {
        let temp_file = write_temp(
            "{\"city\":\"Lisbon\",\"visits\":3}\n{\"city\":\"Porto\",\"visits\":5}\n",
            ".ndjson",
        )?;
        let (items, _) = DataSource::new(temp_file.path())?.load_items().await?;
        let cities: Vec<String> = items.iter().filter_map(|item| item.text("city")).collect();
        assert_eq!(cities, vec!["Lisbon", "Porto"]);
        Ok(())
    }

    #[tokio::test]
    async fn unsupported_extension_and_missing_file() -> GridResult<()> {
        let temp_file = write_temp("whatever", ".xlsx")?;
        let result = DataSource::new(temp_file.path())?.load_dataframe().await;
        assert!(matches!(result, Err(GridError::FileType(_))));

        assert!(matches!(
            DataSource::new(Path::new("/definitely/not/here.csv")),
            Err(GridError::FileNotFound(_))
        ));
        Ok(())
    }
}

use crate::{
    DEFAULT_CSV_DELIMITER, GridConfig, GridError, GridResult, SortDirection, validate_format,
};

use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

// https://stackoverflow.com/questions/74068168/clap-rs-not-printing-colors-during-help
fn get_styles() -> clap::builder::Styles {
    let cyan = anstyle::Color::Ansi(anstyle::AnsiColor::Cyan);
    let green = anstyle::Color::Ansi(anstyle::AnsiColor::Green);
    let yellow = anstyle::Color::Ansi(anstyle::AnsiColor::Yellow);

    clap::builder::Styles::styled()
        .placeholder(anstyle::Style::new().fg_color(Some(yellow)))
        .usage(anstyle::Style::new().fg_color(Some(cyan)).bold())
        .header(
            anstyle::Style::new()
                .fg_color(Some(cyan))
                .bold()
                .underline(),
        )
        .literal(anstyle::Style::new().fg_color(Some(green)))
}

// https://docs.rs/clap/latest/clap/struct.Command.html#method.help_template
const APPLET_TEMPLATE: &str = "\
{before-help}
{about-with-newline}
{usage-heading} {usage}

{all-args}
{after-help}";

const EX1: &str = r#" detail-grid orders.csv -s amount:desc"#;
const EX2: &str = r#" detail-grid orders.csv -f category=Books,Games -r amount=10..50"#;
const EX3: &str = r#" detail-grid orders.parquet -c columns.json -o status -p op"#;

/// Pattern of a numeric range argument: `FIELD=min..max`, either bound optional.
const RANGE_PATTERN: &str =
    r"^(?P<field>[^=]+)=(?P<min>-?\d+(?:\.\d+)?)?\.\.(?P<max>-?\d+(?:\.\d+)?)?$";

/// Initial sort given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field_name: String,
    pub direction: SortDirection,
}

/// Initial filter values given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub field_name: String,
    pub values: Vec<String>,
}

/// Numeric bounds given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSpec {
    pub field_name: String,
    pub min: Option<String>,
    pub max: Option<String>,
}

/// Command-line arguments of the grid host.
#[derive(Parser, Debug, Clone)]
#[command(
    // Read from `Cargo.toml`.
    author, version, about,
    long_about = None,
    next_line_help = true,
    help_template = APPLET_TEMPLATE,
    styles=get_styles(),
    after_help = format!("EXAMPLES:\n{EX1}\n{EX2}\n{EX3}")
)]
pub struct Arguments {
    /// Path to the data file (CSV, JSON, NDJSON, Parquet).
    #[arg(
        value_name = "FILE_PATH",
        help = "Path to data file (CSV/JSON/NDJSON/Parquet)"
    )]
    pub path: PathBuf,

    /// CSV delimiter character. [Default: ';']
    #[arg(
        short = 'd',
        long,
        default_value = DEFAULT_CSV_DELIMITER,
        help = "CSV delimiter character",
        long_help = "Sets the CSV delimiter.\n\
        Auto-detect tries common separators (, ; | \\t) if the first one yields a single column."
    )]
    pub delimiter: String,

    /// JSON file with the column definitions.
    #[arg(
        short = 'c',
        long,
        value_name = "JSON_FILE",
        help = "JSON array of column definitions [Default: inferred from the schema]"
    )]
    pub columns: Option<PathBuf>,

    /// JSON file with the grid configuration.
    #[arg(
        short = 'g',
        long = "grid-config",
        value_name = "JSON_FILE",
        help = "JSON grid configuration (formats, selection, initial sort/filters)"
    )]
    pub grid_config: Option<PathBuf>,

    /// Initial sort: `FIELD:asc` or `FIELD:desc`.
    #[arg(
        short = 's',
        long,
        value_name = "FIELD:DIRECTION",
        help = "Initial sort, e.g. amount:desc",
        value_parser = parse_sort_spec
    )]
    pub sort: Option<SortSpec>,

    /// Initial filter values: `FIELD=v1,v2` (repeatable).
    #[arg(
        short = 'f',
        long = "filter",
        value_name = "FIELD=VALUES",
        help = "Initial filter values, e.g. category=Books,Games [repeatable]",
        value_parser = parse_filter_spec
    )]
    pub filters: Vec<FilterSpec>,

    /// Numeric bounds: `FIELD=min..max` (repeatable).
    #[arg(
        short = 'r',
        long = "range",
        value_name = "FIELD=MIN..MAX",
        help = "Numeric range filter, e.g. amount=10..50 or amount=..99 [repeatable]",
        value_parser = parse_range_spec
    )]
    pub ranges: Vec<RangeSpec>,

    /// Print the autocomplete options of a field.
    #[arg(
        short = 'o',
        long,
        value_name = "FIELD",
        help = "List the distinct filter options of FIELD"
    )]
    pub options: Option<String>,

    /// Narrow the listed options to those containing this text.
    #[arg(
        short = 'p',
        long,
        value_name = "TEXT",
        help = "Partial text narrowing the listed options (case-insensitive)",
        requires = "options"
    )]
    pub partial: Option<String>,

    /// Maximum number of displayed rows printed.
    #[arg(short = 'l', long, value_name = "ROWS", help = "Print at most ROWS rows")]
    pub limit: Option<usize>,

    /// chrono strftime pattern for Date columns.
    #[arg(
        long,
        value_name = "PATTERN",
        help = "Date format, e.g. \"%d/%m/%Y\" [Default: %m/%d/%Y]",
        value_parser = parse_format
    )]
    pub date_format: Option<String>,

    /// chrono strftime pattern for Time columns.
    #[arg(
        long,
        value_name = "PATTERN",
        help = "Time format, e.g. \"%H:%M\" [Default: %I:%M %p]",
        value_parser = parse_format
    )]
    pub time_format: Option<String>,
}

impl Arguments {
    /// Build `Arguments` struct.
    pub fn build() -> Arguments {
        Arguments::parse()
    }

    /// Grid configuration: the JSON file (or defaults) overlaid with the command-line
    /// formats, sort and filters.
    pub fn grid_config(&self) -> GridResult<GridConfig> {
        let mut config = match &self.grid_config {
            Some(path) => GridConfig::from_path(path)?,
            None => GridConfig::default(),
        };

        if let Some(date_format) = &self.date_format {
            config.date_format = date_format.clone();
        }
        if let Some(time_format) = &self.time_format {
            config.time_format = time_format.clone();
        }
        if let Some(sort) = &self.sort {
            config = config.with_initial_sort(&sort.field_name, sort.direction);
        }
        for filter in &self.filters {
            let values: Vec<&str> = filter.values.iter().map(String::as_str).collect();
            config = config.with_initial_filter(&filter.field_name, &values);
        }

        config.validate()?;
        Ok(config)
    }
}

// --- Argument Parsers ---

fn invalid(arg_name: &str, reason: impl Into<String>) -> GridError {
    GridError::InvalidArgument {
        arg_name: arg_name.to_string(),
        reason: reason.into(),
    }
}

/// clap parser for '--sort': `FIELD:asc|desc`.
fn parse_sort_spec(s: &str) -> GridResult<SortSpec> {
    let (field_name, direction) = s
        .rsplit_once(':')
        .ok_or_else(|| invalid("--sort", "expected FIELD:asc or FIELD:desc"))?;

    let direction = SortDirection::parse(direction)
        .ok_or_else(|| invalid("--sort", format!("unknown direction '{direction}'")))?;

    if field_name.trim().is_empty() {
        return Err(invalid("--sort", "missing field name"));
    }

    Ok(SortSpec {
        field_name: field_name.trim().to_string(),
        direction,
    })
}

/// clap parser for '--filter': `FIELD=v1,v2`.
fn parse_filter_spec(s: &str) -> GridResult<FilterSpec> {
    let (field_name, values) = s
        .split_once('=')
        .ok_or_else(|| invalid("--filter", "expected FIELD=VALUE[,VALUE...]"))?;

    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .collect();

    if field_name.trim().is_empty() || values.is_empty() {
        return Err(invalid("--filter", "missing field name or values"));
    }

    Ok(FilterSpec {
        field_name: field_name.trim().to_string(),
        values,
    })
}

/// clap parser for '--range': `FIELD=min..max`, validated by `RANGE_PATTERN`.
fn parse_range_spec(s: &str) -> GridResult<RangeSpec> {
    let regex = Regex::new(RANGE_PATTERN)
        .map_err(|e| invalid("--range", format!("Invalid regex syntax: {e}")))?;

    let captures = regex
        .captures(s.trim())
        .ok_or_else(|| invalid("--range", "expected FIELD=MIN..MAX with numeric bounds"))?;

    let bound = |name: &str| captures.name(name).map(|m| m.as_str().to_string());
    let (min, max) = (bound("min"), bound("max"));

    if min.is_none() && max.is_none() {
        return Err(invalid("--range", "at least one bound is required"));
    }

    Ok(RangeSpec {
        field_name: captures["field"].trim().to_string(),
        min,
        max,
    })
}

/// clap parser for '--date-format' and '--time-format'.
fn parse_format(s: &str) -> GridResult<String> {
    validate_format(s)?;
    Ok(s.to_string())
}

//----------------------------------------------------------------------------//
//                                   Tests                                    //
//----------------------------------------------------------------------------//

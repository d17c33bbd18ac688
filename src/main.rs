#![warn(clippy::all)]

use detail_grid::{
    Arguments, ColumnDefinition, DataSource, DetailsGrid, GridResult, SortState, format_row,
};
use std::fs;
use tracing::{debug, error, info};

/*
cargo fmt
cargo test -- --nocapture
cargo test -- --show-output tests_details_grid
cargo run -- --help
cargo run -- data.csv -s amount:desc -r amount=10..50
cargo doc --open
cargo b -r && cargo install --path=.
*/

#[tokio::main]
async fn main() {
    // Initialize the tracing subscriber for logging.
    // Use RUST_LOG environment variable to set logging level.  eg `export RUST_LOG=info`
    tracing_subscriber::fmt::init();

    // Parse command-line arguments.
    let args = Arguments::build();

    if let Err(err) = run(&args).await {
        error!("Failed to display {:?}: {}", args.path, err);
        std::process::exit(1);
    }
}

/// Loads the data file, mounts the grid and prints its displayed rows.
async fn run(args: &Arguments) -> GridResult<()> {
    let config = args.grid_config()?;

    let mut source = DataSource::new(&args.path)?.with_delimiter(&args.delimiter);
    let (items, inferred) = source.load_items().await?;

    let definitions = match &args.columns {
        Some(path) => ColumnDefinition::list_from_json(&fs::read_to_string(path)?)?,
        None => inferred,
    };

    // RUST_LOG=debug cargo run -- data.csv
    debug!("run()\nDataSource: {source:#?}\nGridConfig: {config:#?}");

    let mut grid = DetailsGrid::new(config, definitions)?.mount(items, None)?;

    for range in &args.ranges {
        grid.set_range_bounds(&range.field_name, range.min.as_deref(), range.max.as_deref())?;
    }

    info!(
        "{} of {} rows displayed",
        grid.displayed_items().len(),
        grid.all_items().len()
    );

    print_rows(&grid, args.limit)?;

    if grid.has_filterable_columns() {
        println!("\n{} filtered column(s)", grid.filter_count());
    }

    if let Some(field_name) = &args.options {
        println!("\nFilter options of '{field_name}':");
        for option in grid.options_for(field_name, args.partial.as_deref())? {
            println!("{:>6}  {}", option.key.to_string(), option.text);
        }
    }

    Ok(())
}

/// Tab-separated header (with sort indicators) followed by the displayed rows.
fn print_rows(grid: &DetailsGrid, limit: Option<usize>) -> GridResult<()> {
    let mut header = Vec::with_capacity(grid.columns().len());
    for column in grid.columns() {
        let state = grid.sort_state(&column.field_name)?;
        match state {
            SortState::NotSorted => header.push(column.name.clone()),
            sorted => header.push(format!("{} {}", column.name, sorted.get_icon())),
        }
    }
    println!("{}", header.join("\t"));

    let limit = limit.unwrap_or(usize::MAX);
    for item in grid.displayed_items().iter().take(limit) {
        println!("{}", format_row(item, grid.columns()).join("\t"));
    }

    Ok(())
}

#![warn(clippy::all)]
#![doc = include_str!("../README.md")]

// Modules that make up the detail-grid library.
mod args;
mod column;
mod config;
mod display;
mod error;
mod field_type;
mod file_extension;
mod filter;
mod grid;
mod handlers;
mod lazy_load;
mod loader;
mod menu;
mod options;
mod selection;
mod sort;
mod traits;
mod transition;
mod value;

// Publicly expose the contents of these modules.
pub use self::{
    // add to lib
    args::*,
    column::*,
    config::*,
    display::*,
    error::*,
    field_type::*,
    file_extension::*,
    filter::*,
    grid::*,
    handlers::*,
    lazy_load::*,
    loader::*,
    menu::*,
    options::*,
    selection::*,
    sort::*,
    traits::*,
    transition::*,
    value::*,
};

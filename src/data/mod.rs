//! Data module - CSV loading

mod loader;

pub use loader::{ColumnError, DataLoader, ParseError, Preview, Table};

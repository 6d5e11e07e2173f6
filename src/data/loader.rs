//! CSV Data Loader Module
//! Handles CSV file loading and column extraction using Polars.

use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Cell texts read as missing values, in every column.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("CSV file has no columns")]
    NoColumns,
}

/// Errors raised when a column is looked up for plotting.
#[derive(Error, Debug)]
pub enum ColumnError {
    #[error("Column '{0}' not found")]
    Missing(String),
    #[error("Column '{name}' is not numeric (type {dtype})")]
    NonNumeric { name: String, dtype: String },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Header plus the first rows of a table, rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// An uploaded CSV file held in memory.
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    source: String,
}

impl Table {
    pub fn new(df: DataFrame, source: impl Into<String>) -> Self {
        Self {
            df,
            source: source.into(),
        }
    }

    /// Name of the file the table was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Get list of numeric column names.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .filter(|col| is_numeric(col.dtype()))
            .map(|col| col.name().to_string())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }

    /// First `rows` rows with every cell rendered as text. Nulls become empty strings.
    pub fn preview(&self, rows: usize) -> Preview {
        let head = self.df.head(Some(rows));
        let columns = self.column_names();
        let rows = (0..head.height())
            .map(|i| {
                head.get_columns()
                    .iter()
                    .map(|col| {
                        col.as_materialized_series()
                            .get(i)
                            .map(|v| cell_text(&v))
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();

        Preview { columns, rows }
    }

    /// Values of a numeric column cast to f64, nulls preserved as `None`.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>, ColumnError> {
        let column = self.column(name)?;
        if !is_numeric(column.dtype()) {
            return Err(ColumnError::NonNumeric {
                name: name.to_string(),
                dtype: column.dtype().to_string(),
            });
        }

        let series = column
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        Ok(series.f64()?.into_iter().collect())
    }

    /// Values of any column rendered as category labels, nulls preserved as `None`.
    pub fn category_values(&self, name: &str) -> Result<Vec<Option<String>>, ColumnError> {
        let series = self.column(name)?.as_materialized_series();
        Ok((0..series.len())
            .map(|i| match series.get(i) {
                Ok(AnyValue::Null) | Err(_) => None,
                Ok(v) => Some(cell_text(&v)),
            })
            .collect())
    }

    fn column(&self, name: &str) -> Result<&Column, ColumnError> {
        self.df
            .column(name)
            .map_err(|_| ColumnError::Missing(name.to_string()))
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Reads CSV sources into [`Table`]s.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file from disk.
    pub fn load_path(path: &Path) -> Result<Table, ParseError> {
        let bytes = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self::load_bytes(&name, bytes)
    }

    /// Load a CSV file already held in memory (e.g. an upload).
    pub fn load_bytes(name: &str, bytes: Vec<u8>) -> Result<Table, ParseError> {
        debug!(file = name, bytes = bytes.len(), "parsing CSV");

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .map_parse_options(|opts| {
                opts.with_null_values(Some(NullValues::AllColumns(
                    NULL_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect(),
                )))
            })
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;

        if df.width() == 0 {
            return Err(ParseError::NoColumns);
        }

        info!(
            file = name,
            rows = df.height(),
            columns = df.width(),
            "loaded CSV"
        );
        Ok(Table::new(df, name))
    }
}

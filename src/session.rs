//! Per-user session state: the current table, replaced wholesale on each upload.

use crate::charts::{ChartRequest, Figure};
use crate::data::{DataLoader, Table};
use crate::error::VisualizerError;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct Session {
    table: Option<Arc<Table>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> Option<&Arc<Table>> {
        self.table.as_ref()
    }

    /// Load a CSV file from disk. The previous table is kept if loading fails.
    pub fn load_path(&mut self, path: &Path) -> Result<Arc<Table>, VisualizerError> {
        self.replace_with(DataLoader::load_path(path))
    }

    /// Load an uploaded CSV file. The previous table is kept if loading fails.
    pub fn load_bytes(&mut self, name: &str, bytes: Vec<u8>) -> Result<Arc<Table>, VisualizerError> {
        self.replace_with(DataLoader::load_bytes(name, bytes))
    }

    fn replace_with(
        &mut self,
        loaded: Result<Table, crate::data::ParseError>,
    ) -> Result<Arc<Table>, VisualizerError> {
        match loaded {
            Ok(table) => Ok(self.replace(table)),
            Err(e) => {
                warn!(error = %e, kept_previous = self.table.is_some(), "load failed");
                Err(e.into())
            }
        }
    }

    /// Install an already parsed table.
    pub fn replace(&mut self, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        self.table = Some(Arc::clone(&table));
        table
    }

    /// Validate the request against the current table and build its figure.
    pub fn generate(&self, request: &ChartRequest) -> Result<Figure, VisualizerError> {
        let table = self.table.as_ref().ok_or(VisualizerError::NoTable)?;
        generate(table, request)
    }
}

/// Validate → build for one request.
pub fn generate(table: &Table, request: &ChartRequest) -> Result<Figure, VisualizerError> {
    if let Err(reason) = request.validate() {
        info!(kind = %request.kind, columns = request.columns.len(), %reason, "request rejected");
        return Err(reason.into());
    }

    let figure = Figure::build(table, request)?;
    info!(kind = %request.kind, columns = ?request.columns, "chart generated");
    Ok(figure)
}

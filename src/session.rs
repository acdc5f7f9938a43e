//! A model together with the files imported into it.

use crate::{
    Result,
    external::{ColumnValues, decode_column, decode_columns},
    import::{ImportSummary, import_file},
    model::{InstanceRef, Model},
    options::ImportOptions,
};
use std::path::Path;

/// Owns a [`Model`] and imports MDF files into it.
///
/// Dropping (or [`closing`](Session::close)) the session releases the model.
/// The binary store files written during import stay on disk; they are
/// addressed by the model's external components and are the caller's to
/// remove.
///
/// ```no_run
/// use mdf_ods::{ImportOptions, Session};
///
/// # fn main() -> mdf_ods::Result<()> {
/// let session = Session::open("drive.mf4", ImportOptions::default())?;
/// for &submatrix in session.submatrices() {
///     for (column, values) in session.decode_submatrix(submatrix)? {
///         println!("{column:?}: {} rows", values?.len());
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session {
    model: Model,
    options: ImportOptions,
    imports: Vec<ImportSummary>,
}

impl Session {
    /// Empty session on the configured base model version.
    pub fn new(options: ImportOptions) -> Result<Self> {
        Ok(Self {
            model: Model::new(&options.base_model_version)?,
            options,
            imports: Vec::new(),
        })
    }

    /// Session holding a single imported file.
    pub fn open(path: impl AsRef<Path>, options: ImportOptions) -> Result<Self> {
        let mut session = Self::new(options)?;
        session.import(path)?;
        Ok(session)
    }

    /// Import another file. A failed import leaves the model unchanged.
    pub fn import(&mut self, path: impl AsRef<Path>) -> Result<&ImportSummary> {
        let summary = import_file(&mut self.model, path, &self.options)?;
        self.imports.push(summary);
        Ok(&self.imports[self.imports.len() - 1])
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn imports(&self) -> &[ImportSummary] {
        &self.imports
    }

    /// Measurement of the most recent import.
    pub fn measurement(&self) -> Option<InstanceRef> {
        self.imports.last().map(|i| i.measurement)
    }

    /// Submatrices of the most recent import.
    pub fn submatrices(&self) -> &[InstanceRef] {
        self.imports.last().map_or(&[], |i| i.submatrices.as_slice())
    }

    pub fn decode_column(&self, column: InstanceRef) -> Result<ColumnValues> {
        decode_column(&self.model, column)
    }

    /// Decode every column of a submatrix. Errors are reported per column.
    pub fn decode_submatrix(
        &self,
        submatrix: InstanceRef,
    ) -> Result<Vec<(InstanceRef, Result<ColumnValues>)>> {
        decode_columns(&self.model, submatrix)
    }

    /// Release the model, handing it to the caller.
    pub fn close(self) -> Model {
        self.model
    }
}

//! Column-oriented data batches for tabular latent-tree models.
//!
//! Purpose
//! -------
//! Provide a small, validated container for one minibatch of heterogeneous
//! tabular data. Each entry is one feature column, either a batch-indexed
//! array of observed values or an explicit missing marker; all present
//! columns share the same row count. Centralizing these checks lets the
//! propagation and training layers assume clean shapes.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one column is present; a fully-missing batch is a caller bug.
//! - Every present column has the same, non-zero length.
//! - Values are carried as `f64` regardless of the feature's semantic type;
//!   discrete features store their category as a whole number.
use crate::treecat::errors::{TreeCatError, TreeCatResult};
use ndarray::Array1;

/// One validated minibatch of column-oriented data.
///
/// `None` marks a column with no observations in this batch; such columns
/// are skipped during conditioning and can be filled in by imputation.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    columns: Vec<Option<Array1<f64>>>,
    batch_size: usize,
}

impl TableData {
    /// Construct a validated batch from per-feature columns.
    ///
    /// # Errors
    /// - [`TreeCatError::AllColumnsMissing`] if no column is present.
    /// - [`TreeCatError::EmptyBatch`] if the first present column has zero
    ///   rows.
    /// - [`TreeCatError::ColumnLengthMismatch`] if present columns disagree
    ///   on length; `index` points at the first offender.
    pub fn new(columns: Vec<Option<Array1<f64>>>) -> TreeCatResult<Self> {
        let batch_size = columns
            .iter()
            .flatten()
            .map(Array1::len)
            .next()
            .ok_or(TreeCatError::AllColumnsMissing)?;
        if batch_size == 0 {
            return Err(TreeCatError::EmptyBatch);
        }
        for (index, column) in columns.iter().enumerate() {
            if let Some(column) = column {
                if column.len() != batch_size {
                    return Err(TreeCatError::ColumnLengthMismatch {
                        index,
                        expected: batch_size,
                        actual: column.len(),
                    });
                }
            }
        }
        Ok(TableData { columns, batch_size })
    }

    /// Number of feature columns, present or missing.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Shared row count of the present columns.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// The column for vertex `v`, or `None` when missing from this batch.
    pub fn column(&self, v: usize) -> Option<&Array1<f64>> {
        self.columns[v].as_ref()
    }

    /// All columns in vertex order.
    pub fn columns(&self) -> &[Option<Array1<f64>>] {
        &self.columns
    }
}

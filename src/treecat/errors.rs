//! Errors for tree-structured latent categorical models (data validation,
//! topology checks, statistics-update invariants, and distribution failures).
//!
//! This module defines a single model error type, [`TreeCatError`], used
//! across the treecat stack, together with the [`TreeCatResult`] alias.
//!
//! ## Conventions
//! - **Indices are 0-based** (vertices, rows, components).
//! - Precondition violations (mismatched lengths, fully-missing batches,
//!   capacity ≤ 1, wrong edge counts, `batch_size > num_rows`) indicate
//!   caller bugs and are rejected immediately with a descriptive error
//!   rather than producing silently-wrong statistics.
//! - Distribution construction failures from `statrs` are normalized to
//!   [`TreeCatError::InvalidDistribution`].
use statrs::distribution::{CategoricalError, NormalError};

/// Crate-wide result alias for treecat operations that may produce
/// [`TreeCatError`].
pub type TreeCatResult<T> = Result<T, TreeCatError>;

/// Unified error type for tree-structured latent categorical modeling.
///
/// Covers input/data validation, tree-topology checks, sufficient-statistics
/// update invariants, and observation-distribution failures. Implements
/// `Display`/`Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeCatError {
    // ---- Model configuration ----
    /// No features were supplied; a model needs at least one column.
    EmptyFeatureSet,

    /// Latent capacity must be at least 2.
    CapacityTooSmall { capacity: usize },

    /// Annealing rate must be finite and strictly positive.
    InvalidAnnealingRate { value: f64 },

    // ---- Tree topology ----
    /// A tree over `V` vertices must have exactly `V - 1` edges.
    EdgeCountMismatch { expected: usize, actual: usize },

    /// An edge connects a vertex to itself.
    SelfLoopEdge { vertex: usize },

    /// An edge endpoint is not a valid vertex id.
    VertexOutOfRange { vertex: usize, num_vertices: usize },

    /// Feature-name list length does not match the vertex count.
    NameCountMismatch { expected: usize, actual: usize },

    /// The requested print root is not a known feature name.
    UnknownRoot { name: String },

    // ---- Input/data validation ----
    /// Number of data columns does not match the number of features.
    FeatureDataMismatch { features: usize, columns: usize },

    /// Every column in the batch is missing.
    AllColumnsMissing,

    /// A present column has zero rows.
    EmptyBatch,

    /// A present column has a different length from the first present column.
    ColumnLengthMismatch { index: usize, expected: usize, actual: usize },

    // ---- Sufficient statistics ----
    /// Minibatch is larger than the declared dataset size.
    BatchExceedsNumRows { batch_size: usize, num_rows: usize },

    /// Latent matrix has the wrong number of vertex rows.
    LatentShapeMismatch { expected_vertices: usize, actual: usize },

    /// A latent assignment is outside `0..capacity`.
    LatentStateOutOfRange { vertex: usize, row: usize, state: usize, capacity: usize },

    // ---- Structure search ----
    /// A proposed edge set does not form a spanning tree over the vertices.
    NotASpanningTree { reason: &'static str },

    // ---- statrs distribution errors ----
    /// Wrapper for observation-distribution construction failures.
    InvalidDistribution { reason: String },
}

impl std::error::Error for TreeCatError {}

impl std::fmt::Display for TreeCatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Model configuration ----
            TreeCatError::EmptyFeatureSet => {
                write!(f, "Feature list is empty; a model needs at least one column.")
            }
            TreeCatError::CapacityTooSmall { capacity } => {
                write!(f, "Latent capacity must be > 1; got: {capacity}")
            }
            TreeCatError::InvalidAnnealingRate { value } => {
                write!(f, "Annealing rate must be finite and > 0; got: {value}")
            }
            // ---- Tree topology ----
            TreeCatError::EdgeCountMismatch { expected, actual } => {
                write!(f, "Edge count mismatch: a tree needs {expected} edges, got {actual}")
            }
            TreeCatError::SelfLoopEdge { vertex } => {
                write!(f, "Edge connects vertex {vertex} to itself.")
            }
            TreeCatError::VertexOutOfRange { vertex, num_vertices } => {
                write!(f, "Edge endpoint {vertex} is out of range for {num_vertices} vertices.")
            }
            TreeCatError::NameCountMismatch { expected, actual } => {
                write!(f, "Feature name count mismatch: expected {expected}, got {actual}")
            }
            TreeCatError::UnknownRoot { name } => {
                write!(f, "Requested root '{name}' is not a known feature name.")
            }
            // ---- Input/data validation ----
            TreeCatError::FeatureDataMismatch { features, columns } => {
                write!(f, "Data has {columns} columns but the model has {features} features.")
            }
            TreeCatError::AllColumnsMissing => {
                write!(f, "Every column in the batch is missing.")
            }
            TreeCatError::EmptyBatch => {
                write!(f, "Present columns must contain at least one row.")
            }
            TreeCatError::ColumnLengthMismatch { index, expected, actual } => {
                write!(
                    f,
                    "Column {index} has {actual} rows but earlier columns have {expected}."
                )
            }
            // ---- Sufficient statistics ----
            TreeCatError::BatchExceedsNumRows { batch_size, num_rows } => {
                write!(f, "Batch size {batch_size} exceeds dataset size {num_rows}.")
            }
            TreeCatError::LatentShapeMismatch { expected_vertices, actual } => {
                write!(
                    f,
                    "Latent matrix has {actual} vertex rows; expected {expected_vertices}."
                )
            }
            TreeCatError::LatentStateOutOfRange { vertex, row, state, capacity } => {
                write!(
                    f,
                    "Latent state {state} at vertex {vertex}, row {row} is out of range for capacity {capacity}."
                )
            }
            // ---- Structure search ----
            TreeCatError::NotASpanningTree { reason } => {
                write!(f, "Proposed edge set is not a spanning tree: {reason}")
            }
            // ---- statrs distribution errors ----
            TreeCatError::InvalidDistribution { reason } => {
                write!(f, "Observation distribution is invalid: {reason}")
            }
        }
    }
}

impl From<NormalError> for TreeCatError {
    fn from(err: NormalError) -> TreeCatError {
        TreeCatError::InvalidDistribution { reason: err.to_string() }
    }
}

impl From<CategoricalError> for TreeCatError {
    fn from(err: CategoricalError) -> TreeCatError {
        TreeCatError::InvalidDistribution { reason: err.to_string() }
    }
}

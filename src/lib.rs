//! rust_tabular — tree-structured latent models for heterogeneous tabular data.
//!
//! Purpose
//! -------
//! Serve as the crate root for the TreeCat stack: a latent categorical model
//! whose per-column latent classes are coupled along a learned spanning tree,
//! trained by interleaving parameter updates with Bayesian structure search
//! over decayed sufficient statistics.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules ([`structure`] and [`treecat`]) as the
//!   public crate surface.
//! - [`structure`] owns the complete-graph pair indexing and the
//!   spanning-tree search seam with its reference kernels.
//! - [`treecat`] owns everything model-side: data containers, topology,
//!   sufficient statistics, the conjugate posterior, the tree forward pass,
//!   feature and sampling seams, and the training loop.
//!
//! Conventions
//! -----------
//! - All numerical containers are `ndarray` arrays of `f64` (probabilities,
//!   counts, column values) or `usize` (latent states).
//! - Errors are surfaced as [`treecat::TreeCatResult`]; the crate performs
//!   no I/O and logs diagnostics through `tracing` at debug level.
pub mod structure;
pub mod treecat;

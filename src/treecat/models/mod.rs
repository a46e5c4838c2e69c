//! models — the TreeCat model surface and its training loop.
//!
//! Purpose
//! -------
//! Collect the user-facing layers built on `treecat::core`: the directed
//! tree forward pass ([`TreePropagator`]), the model object that owns
//! features, topology, and statistics ([`TreeCat`]), and the six-phase
//! minibatch trainer ([`TreeCatTrainer`]).
//!
//! Key behaviors
//! -------------
//! - [`TreePropagator`] walks the tree from its center with an explicit
//!   worklist, conditioning each vertex's latent class on its parent through
//!   the posterior's joint edge tables, and realizes column values through
//!   the frozen per-feature mixtures.
//! - [`TreeCat`] exposes the forward pass, single-sample imputation, edge
//!   installation after structure search, and diagnostic rendering of the
//!   active tree.
//! - [`TreeCatTrainer`] drives the six phases of a training step in strict
//!   order and surfaces any failure without partial effects on the
//!   statistics or topology.
//!
//! Conventions
//! -----------
//! - The forward pass never mutates the model; all mutation happens in the
//!   trainer between passes.
//! - Latent matrices are `(V, batch)` with vertex on the first axis.
pub mod propagate;
pub mod trainer;
pub mod treecat;

pub use self::propagate::{Propagated, TreePropagator};
pub use self::trainer::TreeCatTrainer;
pub use self::treecat::{TreeCat, DEFAULT_ANNEALING_RATE};

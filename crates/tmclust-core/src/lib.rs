//! # tmclust Core Library
//!
//! Sequence-independent clustering of three-dimensional biomolecular
//! chains (protein and RNA) by structural similarity: chains are scanned
//! in descending length order and each either joins the first existing
//! cluster whose representative it matches under a TM-score cutoff, or
//! founds a new cluster.
//!
//! ## Architectural Philosophy
//!
//! The library keeps a strict three-layer separation of concerns:
//!
//! - **[`core`]: The Foundation.** Stateless data models
//!   (`ChainRecord`, `StructureStore`), molecular file reading, and the
//!   structural-alignment primitives behind the `StructureAligner`
//!   trait seam.
//!
//! - **[`engine`]: The Logic Core.** The stateful clustering machinery:
//!   score modes and admissibility bounds, HwRMSD candidate selection,
//!   the two-tier alignment worker, the racing parallel dispatcher, and
//!   the evolving cluster state.
//!
//! - **[`workflows`]: The Public API.** The user-facing entry point
//!   tying core and engine together into the complete clustering run.

pub mod core;
pub mod engine;
pub mod workflows;

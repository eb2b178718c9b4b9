//! Gate fusion for the distq distributed simulator
//!
//! This crate turns a flat gate queue into a shorter queue of dense
//! two-qubit-or-smaller unitaries:
//! - [`FusionGroup`]: greedy grouping of compatible gates
//! - [`FusedGate`]: the dense gate a finalized group collapses into
//! - [`fuse_queue`]: one-call queue-to-queue fusion
//!
//! Fusion reduces the number of tensor contractions each execution device
//! performs; the distributed engine consumes the fused queue unchanged.

pub mod fusion;
pub mod matrix_utils;

pub use fusion::{fuse_queue, FusedGate, FusionGroup};

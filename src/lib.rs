//! Gradient scaling and diagonal Gaussian helpers for optimization pipelines.
//!
//! The workspace is split the same way the pieces are used:
//! - [`pytree`] holds the nested-structure traversal shared by tree-aware helpers.
//! - [`gradients`] rescales or cuts gradients leaf by leaf and differentiates
//!   scalar functions of trees.
//! - [`distributions`] provides the log-scale parameterized [`DiagonalNormal`]
//!   together with the explicit [`PrngKey`] that drives its sampling.

pub use distributions;
pub use gradients;
pub use pytree;

pub use distributions::{
    broadcast_shapes, multi_normal, DiagonalNormal, DistributionError, PrngKey,
};
pub use gradients::{cast_tree, grad, scale_gradient, value_and_grad, Differentiable};
pub use pytree::{NodeKind, Tree, TreeError};

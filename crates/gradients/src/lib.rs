//! Gradient utilities built on Candle's reverse-mode autodiff.
//!
//! [`scale_gradient`] leaves forward values untouched while rescaling (or
//! cutting) the gradient that flows back through each leaf of a [`Tree`].
//! [`value_and_grad`] is the matching entry point for differentiating a
//! scalar function of a tree of tensors.

pub mod autodiff;
pub mod cast;
pub mod differentiable;
pub mod scale;

pub use autodiff::{grad, value_and_grad};
pub use cast::cast_tree;
pub use differentiable::Differentiable;
pub use pytree::Tree;
pub use scale::scale_gradient;

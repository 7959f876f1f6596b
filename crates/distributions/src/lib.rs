//! Diagonal Gaussian helpers for sampling and scoring tensors.
//!
//! [`multi_normal`] builds a [`DiagonalNormal`] from a mean and a log standard
//! deviation of possibly different (broadcastable) shapes. Sampling takes an
//! explicit [`PrngKey`], so results depend only on the key.

mod errors;
pub mod key;
pub mod normal;
pub mod shape;

pub use errors::{DistributionError, Result};
pub use key::PrngKey;
pub use normal::{multi_normal, DiagonalNormal};
pub use shape::broadcast_shapes;

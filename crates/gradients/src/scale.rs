//! Forward-transparent gradient scaling.

use candle_core::Result;
use pytree::Tree;

use crate::Differentiable;

/// Returns `inputs` unchanged while scaling every leaf's backward gradient by `scale`.
///
/// A scale of `1.0` returns the tree as-is. A scale of `0.0` routes every leaf
/// through [`Differentiable::stop_gradient`] exactly once, so the backward
/// pass terminates here instead of producing a product with zero. Any other
/// scale goes through [`Differentiable::scale_backward`]. The nesting of the
/// output always matches `inputs`.
pub fn scale_gradient<T: Differentiable>(inputs: &Tree<T>, scale: f64) -> Result<Tree<T>> {
    if scale == 1.0 {
        log::trace!("scale_gradient: identity over {} leaves", inputs.num_leaves());
        return Ok(inputs.clone());
    }
    if scale == 0.0 {
        log::trace!(
            "scale_gradient: stopping gradient on {} leaves",
            inputs.num_leaves()
        );
        return inputs.try_map(T::stop_gradient);
    }
    log::trace!(
        "scale_gradient: scaling by {scale} on {} leaves",
        inputs.num_leaves()
    );
    inputs.try_map(|leaf| leaf.scale_backward(scale))
}

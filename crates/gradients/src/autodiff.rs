//! Reverse-mode entry points over trees of tensors.

use candle_core::{bail, Result, Tensor, Var};
use pytree::Tree;

/// Evaluates `f` at `inputs` and returns the value with the gradient of every leaf.
///
/// Each leaf is detached and copied into a fresh [`Var`] before `f` runs, so
/// the caller's tensors, variables included, never take part in the graph.
/// `f` must produce a rank-0 tensor. Leaves the output does not depend on
/// (including leaves cut by a stop-gradient) get an exact zero tensor of
/// their own shape and dtype.
pub fn value_and_grad<F>(f: F, inputs: &Tree<Tensor>) -> Result<(Tensor, Tree<Tensor>)>
where
    F: FnOnce(&Tree<Tensor>) -> Result<Tensor>,
{
    let vars = inputs.try_map(|leaf| Var::from_tensor(&leaf.detach()))?;
    let tracked = vars.map(|var| var.as_tensor().clone());
    let output = f(&tracked)?;
    if output.rank() != 0 {
        bail!(
            "value_and_grad expects a scalar output, got shape {:?}",
            output.dims()
        );
    }

    let store = output.backward()?;
    let grads = vars.try_map(|var| match store.get(var.as_tensor()) {
        Some(grad) => Ok(grad.clone()),
        None => var.zeros_like(),
    })?;
    log::trace!("value_and_grad: computed {} leaf gradients", grads.num_leaves());
    Ok((output.detach(), grads))
}

/// Gradient-only form of [`value_and_grad`].
pub fn grad<F>(f: F, inputs: &Tree<Tensor>) -> Result<Tree<Tensor>>
where
    F: FnOnce(&Tree<Tensor>) -> Result<Tensor>,
{
    value_and_grad(f, inputs).map(|(_, grads)| grads)
}

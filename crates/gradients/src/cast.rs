//! Dtype conversion across every leaf of a tree.

use candle_core::{DType, Result, Tensor};
use pytree::Tree;

/// Casts every leaf to `dtype`; leaves already in `dtype` are shared, not copied.
pub fn cast_tree(tree: &Tree<Tensor>, dtype: DType) -> Result<Tree<Tensor>> {
    tree.try_map(|leaf| {
        if leaf.dtype() == dtype {
            Ok(leaf.clone())
        } else {
            leaf.to_dtype(dtype)
        }
    })
}

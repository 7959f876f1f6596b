//! NumPy-style shape broadcasting.
//!
//! Shapes are aligned on their trailing dimensions; missing leading
//! dimensions count as 1. Two dimensions are compatible when they are equal
//! or one of them is 1, and the broadcast dimension is the larger of the two.

use crate::{DistributionError, Result};

/// Broadcasts two shapes, failing with [`DistributionError::IncompatibleShapes`].
pub fn broadcast_shapes(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    broadcast_with_context("broadcast_shapes", lhs, rhs)
}

pub(crate) fn broadcast_with_context(
    context: &'static str,
    lhs: &[usize],
    rhs: &[usize],
) -> Result<Vec<usize>> {
    let rank = lhs.len().max(rhs.len());
    let mut dims = vec![0; rank];
    for (idx, dim) in dims.iter_mut().enumerate() {
        let rev = rank - idx;
        let l = if lhs.len() < rev { 1 } else { lhs[lhs.len() - rev] };
        let r = if rhs.len() < rev { 1 } else { rhs[rhs.len() - rev] };
        *dim = if l == r || r == 1 {
            l
        } else if l == 1 {
            r
        } else {
            return Err(DistributionError::IncompatibleShapes {
                context,
                lhs: lhs.to_vec(),
                rhs: rhs.to_vec(),
            });
        };
    }
    Ok(dims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligns_trailing_dimensions() {
        assert_eq!(broadcast_shapes(&[1, 4], &[3, 4]).unwrap(), vec![3, 4]);
        assert_eq!(
            broadcast_shapes(&[1, 2, 1, 3], &[2, 1, 4, 3]).unwrap(),
            vec![2, 2, 4, 3]
        );
        assert_eq!(broadcast_shapes(&[4, 3], &[3]).unwrap(), vec![4, 3]);
        assert_eq!(broadcast_shapes(&[], &[2, 5]).unwrap(), vec![2, 5]);
        assert_eq!(broadcast_shapes(&[], &[]).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn zero_sized_dimensions_follow_the_same_rule() {
        assert_eq!(broadcast_shapes(&[0, 3], &[1, 3]).unwrap(), vec![0, 3]);
        assert!(broadcast_shapes(&[0], &[2]).is_err());
    }

    #[test]
    fn rejects_mismatched_dimensions() {
        let err = broadcast_shapes(&[2, 3], &[3, 2]).unwrap_err();
        match err {
            DistributionError::IncompatibleShapes { context, lhs, rhs } => {
                assert_eq!(context, "broadcast_shapes");
                assert_eq!(lhs, vec![2, 3]);
                assert_eq!(rhs, vec![3, 2]);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(broadcast_shapes(&[1, 2, 1, 3], &[2, 1, 4, 4]).is_err());
    }
}

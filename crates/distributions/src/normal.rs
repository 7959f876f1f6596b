//! Gaussian with diagonal covariance, parameterized by mean and log standard deviation.

use candle_core::{Shape, Tensor};

use crate::{shape::broadcast_with_context, DistributionError, PrngKey, Result};

/// `ln(2π)`.
const LOG_TWO_PI: f64 = 1.837_877_066_409_345_5;

/// Multivariate normal with independent components.
///
/// `loc` and `log_scale` may have different shapes as long as they broadcast;
/// the broadcast result is the parameter (event) shape. Every method is pure,
/// so a distribution can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct DiagonalNormal {
    loc: Tensor,
    log_scale: Tensor,
    scale: Tensor,
    param_shape: Shape,
}

/// Builds a [`DiagonalNormal`] from borrowed parameters.
pub fn multi_normal(loc: &Tensor, log_scale: &Tensor) -> Result<DiagonalNormal> {
    DiagonalNormal::new(loc.clone(), log_scale.clone())
}

impl DiagonalNormal {
    /// Validates the parameters and caches the broadcast shape and `exp(log_scale)`.
    ///
    /// Fails with [`DistributionError::IncompatibleShapes`] when the two shapes
    /// do not broadcast. Nothing is validated lazily afterwards.
    pub fn new(loc: Tensor, log_scale: Tensor) -> Result<Self> {
        let param_shape = broadcast_with_context("multi_normal", loc.dims(), log_scale.dims())?;
        if loc.dtype() != log_scale.dtype() {
            return Err(DistributionError::DTypeMismatch {
                loc: loc.dtype(),
                log_scale: log_scale.dtype(),
            });
        }
        if !loc.device().same_device(log_scale.device()) {
            return Err(DistributionError::DeviceMismatch);
        }

        let scale = log_scale.exp()?;
        log::debug!(
            "diagonal normal: loc {:?}, log_scale {:?}, param_shape {:?}",
            loc.dims(),
            log_scale.dims(),
            param_shape
        );
        Ok(Self {
            loc,
            log_scale,
            scale,
            param_shape: Shape::from(param_shape),
        })
    }

    /// The parameters exactly as supplied, before broadcasting.
    pub fn params(&self) -> (&Tensor, &Tensor) {
        (&self.loc, &self.log_scale)
    }

    pub fn loc(&self) -> &Tensor {
        &self.loc
    }

    pub fn log_scale(&self) -> &Tensor {
        &self.log_scale
    }

    /// `exp(log_scale)` in the shape of `log_scale`.
    pub fn scale(&self) -> &Tensor {
        &self.scale
    }

    pub fn param_shape(&self) -> &[usize] {
        self.param_shape.dims()
    }

    pub fn mean(&self) -> Result<Tensor> {
        Ok(self.loc.broadcast_as(self.param_shape.clone())?)
    }

    pub fn stddev(&self) -> Result<Tensor> {
        Ok(self.scale.broadcast_as(self.param_shape.clone())?)
    }

    /// Draws samples shaped `sample_shape ++ param_shape`.
    ///
    /// `sample_shape` accepts anything candle turns into a [`Shape`]: tuples,
    /// `Vec<usize>`, slices, or `()` for a single draw. The same key always
    /// returns the same samples. Output dtype and device follow `loc`.
    pub fn sample(&self, sample_shape: impl Into<Shape>, key: &PrngKey) -> Result<Tensor> {
        let mut dims = sample_shape.into().dims().to_vec();
        dims.extend_from_slice(self.param_shape());
        log::trace!("diagonal normal: sampling shape {:?}", dims);

        let noise = key.normal(dims, self.loc.dtype(), self.loc.device())?;
        let samples = noise
            .broadcast_mul(&self.scale)?
            .broadcast_add(&self.loc)?;
        Ok(samples)
    }

    /// Log density of `x`, summed over the event (parameter) dimensions.
    ///
    /// `x` must broadcast against `param_shape`. Any extra leading dimensions
    /// of `x` are batch dimensions and survive in the output, so an input
    /// shaped exactly like `param_shape` yields a rank-0 tensor.
    pub fn log_prob(&self, x: &Tensor) -> Result<Tensor> {
        broadcast_with_context("log_prob", x.dims(), self.param_shape())?;

        let standardized = x.broadcast_sub(&self.loc)?.broadcast_div(&self.scale)?;
        let normalizer = self.log_scale.affine(2.0, LOG_TWO_PI)?;
        let per_element = standardized
            .sqr()?
            .broadcast_add(&normalizer)?
            .affine(-0.5, 0.0)?;

        let event_rank = self.param_shape.rank();
        if event_rank == 0 {
            return Ok(per_element);
        }
        let rank = per_element.rank();
        let event_dims: Vec<usize> = (rank - event_rank..rank).collect();
        Ok(per_element.sum(event_dims)?)
    }

    /// Differential entropy of the full event, as a rank-0 tensor.
    pub fn entropy(&self) -> Result<Tensor> {
        let per_element = self
            .log_scale
            .broadcast_as(self.param_shape.clone())?
            .affine(1.0, 0.5 * (1.0 + LOG_TWO_PI))?;
        Ok(per_element.sum_all()?)
    }
}

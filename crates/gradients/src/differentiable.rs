//! Gradient-routing capabilities of the tensor runtime.
//!
//! Everything in this crate reaches the autodiff engine through
//! [`Differentiable`], so alternative leaf types (wrappers that record calls,
//! or tensors from another backend) can take part in the same traversals.

use candle_core::{CpuStorage, CustomOp1, DType, Error, Layout, Result, Shape, Tensor};

/// Leaf values whose gradients can be cut or rescaled.
pub trait Differentiable: Clone {
    /// Identity in the forward direction; contributes no gradient backward.
    fn stop_gradient(&self) -> Result<Self>;

    /// Identity in the forward direction; multiplies the incoming gradient by
    /// `scale` backward.
    fn scale_backward(&self, scale: f64) -> Result<Self>;
}

impl Differentiable for Tensor {
    fn stop_gradient(&self) -> Result<Self> {
        Ok(self.detach())
    }

    fn scale_backward(&self, scale: f64) -> Result<Self> {
        if self.device().is_cpu() {
            return self.contiguous()?.apply_op1(ScaleGradient { scale });
        }
        scaled_residual(self, scale)
    }
}

/// `x` forward, `scale * g` backward, from stock ops for devices without a
/// custom kernel.
fn scaled_residual(x: &Tensor, scale: f64) -> Result<Tensor> {
    // f16 cannot hold large scales; an overflowed factor times zero is NaN.
    let wide = match x.dtype() {
        DType::F16 => x.to_dtype(DType::F32)?,
        _ => x.clone(),
    };
    // `wide - detach(wide)` is zero forward for finite `x`, so the value never sees `scale`.
    let residual = wide
        .sub(&wide.detach())?
        .affine(scale, 0.0)?
        .to_dtype(x.dtype())?;
    x.detach().add(&residual)
}

/// Copies its input forward and rescales the gradient backward.
#[derive(Debug, Clone, Copy)]
struct ScaleGradient {
    scale: f64,
}

impl CustomOp1 for ScaleGradient {
    fn name(&self) -> &'static str {
        "scale-gradient"
    }

    fn cpu_fwd(&self, storage: &CpuStorage, layout: &Layout) -> Result<(CpuStorage, Shape)> {
        let (start, end) = layout
            .contiguous_offsets()
            .ok_or_else(|| Error::Msg("scale-gradient expects a contiguous input".into()))?;
        let copied = match storage {
            CpuStorage::U8(data) => CpuStorage::U8(data[start..end].to_vec()),
            CpuStorage::U32(data) => CpuStorage::U32(data[start..end].to_vec()),
            CpuStorage::I64(data) => CpuStorage::I64(data[start..end].to_vec()),
            CpuStorage::BF16(data) => CpuStorage::BF16(data[start..end].to_vec()),
            CpuStorage::F16(data) => CpuStorage::F16(data[start..end].to_vec()),
            CpuStorage::F32(data) => CpuStorage::F32(data[start..end].to_vec()),
            CpuStorage::F64(data) => CpuStorage::F64(data[start..end].to_vec()),
            #[allow(unreachable_patterns)]
            _ => {
                return Err(Error::Msg(
                    "scale-gradient does not support this storage dtype".into(),
                ))
            }
        };
        Ok((copied, layout.shape().clone()))
    }

    fn bwd(&self, _arg: &Tensor, _res: &Tensor, grad_res: &Tensor) -> Result<Option<Tensor>> {
        grad_res.affine(self.scale, 0.0).map(Some)
    }
}

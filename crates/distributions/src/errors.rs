use candle_core::DType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DistributionError>;

#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("{context}: shapes {lhs:?} and {rhs:?} cannot be broadcast together")]
    IncompatibleShapes {
        context: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    #[error("loc dtype {loc:?} does not match log_scale dtype {log_scale:?}")]
    DTypeMismatch { loc: DType, log_scale: DType },

    #[error("loc and log_scale must live on the same device")]
    DeviceMismatch,

    #[error("tensor runtime error: {0}")]
    Runtime(#[from] candle_core::Error),
}

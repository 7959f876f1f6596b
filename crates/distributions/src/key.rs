//! Explicit random keys.
//!
//! Every random draw in this crate is a pure function of a [`PrngKey`]; there
//! is no ambient generator. Keys are cheap `Copy` values and can be split into
//! independent child keys when a caller needs several streams.

use candle_core::{bail, DType, Device, Result, Shape, Tensor};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

const SPLIT_DOMAIN: u64 = 0x243f_6a88_85a3_08d3;
const FOLD_DOMAIN: u64 = 0x1319_8a2e_0370_7344;

/// Reproducible handle for a stream of random draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrngKey {
    seed: u64,
}

impl PrngKey {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derives two child keys.
    pub fn split(&self) -> (PrngKey, PrngKey) {
        let mut rng = StdRng::seed_from_u64(self.seed ^ SPLIT_DOMAIN);
        let first = PrngKey::new(rng.next_u64());
        let second = PrngKey::new(rng.next_u64());
        log::trace!("split key {} into {} and {}", self.seed, first.seed, second.seed);
        (first, second)
    }

    /// Derives `count` child keys; the first two match [`PrngKey::split`].
    pub fn split_n(&self, count: usize) -> Vec<PrngKey> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ SPLIT_DOMAIN);
        (0..count).map(|_| PrngKey::new(rng.next_u64())).collect()
    }

    /// Derives a key that depends on both this key and `data`.
    pub fn fold_in(&self, data: u64) -> PrngKey {
        let mixed = self.seed ^ data.wrapping_mul(FOLD_DOMAIN).rotate_left(17);
        PrngKey::new(StdRng::seed_from_u64(mixed).next_u64())
    }

    /// Draws independent standard-normal noise with the requested shape.
    ///
    /// Half precision dtypes are drawn in `f32` and cast afterwards.
    pub fn normal(&self, shape: impl Into<Shape>, dtype: DType, device: &Device) -> Result<Tensor> {
        let shape = shape.into();
        let count = shape.elem_count();
        let mut rng = StdRng::seed_from_u64(self.seed);
        log::trace!("drawing {count} normal values for shape {shape:?} from key {}", self.seed);
        match dtype {
            DType::F64 => {
                let data: Vec<f64> = StandardNormal.sample_iter(&mut rng).take(count).collect();
                Tensor::from_vec(data, shape, device)
            }
            DType::F32 | DType::F16 | DType::BF16 => {
                let data: Vec<f32> = StandardNormal.sample_iter(&mut rng).take(count).collect();
                let noise = Tensor::from_vec(data, shape, device)?;
                if dtype == DType::F32 {
                    Ok(noise)
                } else {
                    noise.to_dtype(dtype)
                }
            }
            other => bail!("normal noise requires a float dtype, got {other:?}"),
        }
    }
}

impl From<u64> for PrngKey {
    fn from(seed: u64) -> Self {
        PrngKey::new(seed)
    }
}

use candle_core::{DType, Device, Tensor};
use distributions::{multi_normal, DiagonalNormal, DistributionError, PrngKey, Result};

const LOG_TWO_PI: f64 = 1.837_877_066_409_345_5;

fn loc_and_log_scale(loc_shape: &[usize], scale_shape: &[usize]) -> Result<(Tensor, Tensor)> {
    let device = Device::Cpu;
    let loc = Tensor::full(1.5f32, loc_shape, &device)?;
    let log_scale = Tensor::full(0.5f32, scale_shape, &device)?;
    Ok((loc, log_scale))
}

fn scalar(t: &Tensor) -> Result<f64> {
    Ok(t.to_dtype(DType::F64)?.to_scalar::<f64>()?)
}

#[test]
fn broadcastable_parameters_are_accepted() -> Result<()> {
    let cases: [(&[usize], &[usize], &[usize]); 5] = [
        (&[1], &[1], &[1]),
        (&[5], &[5], &[5]),
        (&[2, 3], &[2, 3], &[2, 3]),
        (&[1, 4], &[3, 4], &[3, 4]),
        (&[1, 2, 1, 3], &[2, 1, 4, 3], &[2, 2, 4, 3]),
    ];
    for (loc_shape, scale_shape, expected) in cases {
        let (loc, log_scale) = loc_and_log_scale(loc_shape, scale_shape)?;
        let dist = multi_normal(&loc, &log_scale)?;
        let (mean, log_scale) = dist.params();
        assert_eq!(mean.dims(), loc_shape);
        assert_eq!(log_scale.dims(), scale_shape);
        assert_eq!(dist.param_shape(), expected);
    }
    Ok(())
}

#[test]
fn incompatible_parameters_fail_at_construction() -> Result<()> {
    let cases: [(&[usize], &[usize]); 4] = [
        (&[2], &[3]),
        (&[2, 3], &[3, 2]),
        (&[2, 4], &[3, 4]),
        (&[1, 2, 1, 3], &[2, 1, 4, 4]),
    ];
    for (loc_shape, scale_shape) in cases {
        let (loc, log_scale) = loc_and_log_scale(loc_shape, scale_shape)?;
        let err = multi_normal(&loc, &log_scale).unwrap_err();
        assert!(
            matches!(
                err,
                DistributionError::IncompatibleShapes {
                    context: "multi_normal",
                    ..
                }
            ),
            "{loc_shape:?} vs {scale_shape:?}: {err}"
        );
    }
    Ok(())
}

#[test]
fn mismatched_dtypes_fail_at_construction() -> Result<()> {
    let device = Device::Cpu;
    let loc = Tensor::zeros((2,), DType::F32, &device)?;
    let log_scale = Tensor::zeros((2,), DType::F64, &device)?;
    let err = DiagonalNormal::new(loc, log_scale).unwrap_err();
    assert!(matches!(
        err,
        DistributionError::DTypeMismatch {
            loc: DType::F32,
            log_scale: DType::F64
        }
    ));
    Ok(())
}

#[test]
fn params_are_returned_unchanged() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[1, 4], &[3, 4])?;
    let dist = multi_normal(&loc, &log_scale)?;
    let (mean, scale) = dist.params();
    assert_eq!(mean.id(), loc.id());
    assert_eq!(scale.id(), log_scale.id());
    assert_eq!(dist.loc().dims(), &[1, 4]);
    assert_eq!(dist.log_scale().dims(), &[3, 4]);
    Ok(())
}

#[test]
fn sample_shape_accepts_vectors_tuples_and_slices() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[2, 3], &[2, 3])?;
    let dist = multi_normal(&loc, &log_scale)?;
    let key = PrngKey::new(239);

    let from_vec = dist.sample(vec![4, 5], &key)?;
    let from_tuple = dist.sample((4, 5), &key)?;
    let from_slice = dist.sample(&[4usize, 5][..], &key)?;

    assert_eq!(from_vec.dims(), &[4, 5, 2, 3]);
    assert_eq!(from_tuple.dims(), &[4, 5, 2, 3]);
    let expected = from_vec.flatten_all()?.to_vec1::<f32>()?;
    assert_eq!(from_tuple.flatten_all()?.to_vec1::<f32>()?, expected);
    assert_eq!(from_slice.flatten_all()?.to_vec1::<f32>()?, expected);
    Ok(())
}

#[test]
fn empty_and_zero_sized_sample_shapes() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[1, 3], &[2, 1])?;
    let dist = multi_normal(&loc, &log_scale)?;
    let key = PrngKey::new(3);

    assert_eq!(dist.sample((), &key)?.dims(), &[2, 3]);
    assert_eq!(dist.sample(Vec::<usize>::new(), &key)?.dims(), &[2, 3]);
    let empty = dist.sample(vec![0, 2], &key)?;
    assert_eq!(empty.dims(), &[0, 2, 2, 3]);
    assert_eq!(empty.elem_count(), 0);
    Ok(())
}

#[test]
fn samples_depend_only_on_the_key() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[3], &[3])?;
    let dist = multi_normal(&loc, &log_scale)?;
    let (left, right) = PrngKey::new(17).split();

    let a = dist.sample(8, &left)?.to_vec2::<f32>()?;
    let b = dist.clone().sample(8, &left)?.to_vec2::<f32>()?;
    let c = dist.sample(8, &right)?.to_vec2::<f32>()?;
    assert_eq!(a, b);
    assert_ne!(a, c);
    Ok(())
}

#[test]
fn samples_match_location_and_scale() -> Result<()> {
    let device = Device::Cpu;
    let loc = Tensor::new(&[0f32, 3.0], &device)?;
    let log_scale = Tensor::new(&[0f32, 2f32.ln()], &device)?;
    let dist = multi_normal(&loc, &log_scale)?;

    let samples = dist.sample(20_000, &PrngKey::new(2024))?;
    assert_eq!(samples.dims(), &[20_000, 2]);
    let mean = samples.mean(0)?;
    let std = samples.broadcast_sub(&mean)?.sqr()?.mean(0)?.sqrt()?;

    let mean = mean.to_vec1::<f32>()?;
    let std = std.to_vec1::<f32>()?;
    assert!((mean[0] - 0.0).abs() < 0.08, "mean {mean:?}");
    assert!((mean[1] - 3.0).abs() < 0.08, "mean {mean:?}");
    assert!((std[0] - 1.0).abs() < 0.08, "std {std:?}");
    assert!((std[1] - 2.0).abs() < 0.08, "std {std:?}");
    Ok(())
}

#[test]
fn log_prob_is_rank_zero_for_event_shaped_inputs() -> Result<()> {
    let shapes: [&[usize]; 3] = [&[1], &[2, 3], &[1, 2, 3, 4]];
    for shape in shapes {
        let (loc, log_scale) = loc_and_log_scale(shape, shape)?;
        let dist = multi_normal(&loc, &log_scale)?;
        let x = Tensor::ones(shape, DType::F32, &Device::Cpu)?;
        let log_prob = dist.log_prob(&x)?;
        assert_eq!(log_prob.rank(), 0, "shape {shape:?}");
        assert!(scalar(&log_prob)?.is_finite());
    }
    Ok(())
}

#[test]
fn log_prob_at_the_mean() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[2, 3], &[2, 3])?;
    let dist = multi_normal(&loc, &log_scale)?;
    let value = scalar(&dist.log_prob(&loc)?)?;
    let expected = -0.5 * 6.0 * LOG_TWO_PI - 6.0 * 0.5;
    assert!((value - expected).abs() < 1e-4, "{value} vs {expected}");
    Ok(())
}

#[test]
fn log_prob_matches_closed_form() -> Result<()> {
    let device = Device::Cpu;
    let loc = Tensor::new(&[0f64, 1.0], &device)?;
    let log_scale = Tensor::new(&[0f64, 2f64.ln()], &device)?;
    let dist = multi_normal(&loc, &log_scale)?;

    let x = Tensor::new(&[1f64, 2.0], &device)?;
    let value = dist.log_prob(&x)?.to_scalar::<f64>()?;
    let expected = -0.5 * (1.25 + 2.0 * LOG_TWO_PI + 2.0 * 2f64.ln());
    assert!((value - expected).abs() < 1e-12, "{value} vs {expected}");
    Ok(())
}

#[test]
fn log_prob_keeps_leading_batch_dimensions() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[2, 3], &[1, 3])?;
    let dist = multi_normal(&loc, &log_scale)?;
    let x = PrngKey::new(9).normal((5, 2, 3), DType::F32, &Device::Cpu)?;

    let batched = dist.log_prob(&x)?;
    assert_eq!(batched.dims(), &[5]);
    let batched = batched.to_vec1::<f32>()?;
    for (idx, value) in batched.iter().enumerate() {
        let single = dist.log_prob(&x.get(idx)?)?.to_scalar::<f32>()?;
        assert!((value - single).abs() < 1e-5);
    }
    Ok(())
}

#[test]
fn scalar_parameters_score_elementwise() -> Result<()> {
    let device = Device::Cpu;
    let dist = multi_normal(&Tensor::new(0f64, &device)?, &Tensor::new(0f64, &device)?)?;
    assert!(dist.param_shape().is_empty());

    let x = Tensor::new(&[0f64, 1.0, -2.0], &device)?;
    let values = dist.log_prob(&x)?.to_vec1::<f64>()?;
    for (value, point) in values.iter().zip([0f64, 1.0, -2.0]) {
        let expected = -0.5 * (point * point + LOG_TWO_PI);
        assert!((value - expected).abs() < 1e-12);
    }
    Ok(())
}

#[test]
fn log_prob_rejects_non_broadcastable_inputs() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[2, 3], &[2, 3])?;
    let dist = multi_normal(&loc, &log_scale)?;
    let x = Tensor::ones((3, 2), DType::F32, &Device::Cpu)?;
    let err = dist.log_prob(&x).unwrap_err();
    assert!(matches!(
        err,
        DistributionError::IncompatibleShapes {
            context: "log_prob",
            ..
        }
    ));
    Ok(())
}

#[test]
fn moments_and_entropy() -> Result<()> {
    let (loc, log_scale) = loc_and_log_scale(&[1, 3], &[2, 1])?;
    let dist = multi_normal(&loc, &log_scale)?;

    let mean = dist.mean()?;
    let stddev = dist.stddev()?;
    assert_eq!(mean.dims(), &[2, 3]);
    assert_eq!(stddev.dims(), &[2, 3]);
    let expected_std = 0.5f32.exp();
    for value in stddev.flatten_all()?.to_vec1::<f32>()? {
        assert!((value - expected_std).abs() < 1e-6);
    }

    let entropy = scalar(&dist.entropy()?)?;
    let expected = 6.0 * (0.5 * (1.0 + LOG_TWO_PI) + 0.5);
    assert!((entropy - expected).abs() < 1e-4, "{entropy} vs {expected}");
    Ok(())
}

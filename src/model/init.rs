//! Parameter initialization
//!
//! Weights are drawn from a truncated normal distribution (values beyond two
//! standard deviations are redrawn); biases start at a small positive
//! constant. Sampling goes through a caller-supplied seeded RNG so that, for
//! a fixed seed, initialization is bit-reproducible across runs.

use burn::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Standard deviation for weight initialization
pub const WEIGHT_STD: f32 = 0.05;

/// Constant value for bias initialization
pub const BIAS_VALUE: f32 = 0.05;

/// Sample a tensor from a truncated normal distribution with mean 0.
pub fn truncated_normal<B: Backend, const D: usize>(
    shape: [usize; D],
    std: f32,
    rng: &mut ChaCha8Rng,
    device: &B::Device,
) -> Tensor<B, D> {
    let count: usize = shape.iter().product();
    let dist = Normal::new(0.0f32, std).expect("standard deviation must be positive");

    let data: Vec<f32> = (0..count)
        .map(|_| loop {
            let v = dist.sample(rng);
            if v.abs() <= 2.0 * std {
                break v;
            }
        })
        .collect();

    Tensor::from_data(TensorData::new(data, shape), device)
}

/// Create a constant bias tensor of the given length.
pub fn constant_bias<B: Backend>(size: usize, device: &B::Device) -> Tensor<B, 1> {
    Tensor::full([size], BIAS_VALUE, device)
}

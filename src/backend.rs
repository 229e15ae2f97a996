//! Backend selection
//!
//! Training runs on the CPU NdArray backend wrapped in Burn's autodiff
//! decorator. The ndarray kernels may use SIMD internally; the driver itself
//! is single-threaded and synchronous.

use burn::backend::{Autodiff, NdArray};

/// Inference/evaluation backend
pub type DefaultBackend = NdArray<f32>;

/// Autodiff backend used for training
pub type TrainingBackend = Autodiff<DefaultBackend>;

/// Get the default device for the backend
pub fn default_device() -> <DefaultBackend as burn::tensor::backend::Backend>::Device {
    Default::default()
}

/// Human-readable name for the current backend
pub fn backend_name() -> &'static str {
    "NdArray (CPU)"
}

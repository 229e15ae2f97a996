//! Training module
//!
//! Iteration-based supervised training with epoch-boundary evaluation and
//! checkpointing.

pub mod trainer;

pub use trainer::{train, Learner, TrainContext, TrainSummary};

use burn::config::Config;

use crate::{BATCH_SIZE, IMAGE_SIZE, LEARNING_RATE, NUM_ITERATIONS, VALIDATION_FRACTION};

/// Configuration for a training run
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// Number of output classes
    pub num_classes: usize,

    /// Directory where checkpoints are written
    pub output_dir: String,

    /// Input image edge size
    #[config(default = "IMAGE_SIZE")]
    pub image_size: usize,

    /// Examples per optimizer step
    #[config(default = "BATCH_SIZE")]
    pub batch_size: usize,

    /// Total optimizer steps
    #[config(default = "NUM_ITERATIONS")]
    pub num_iterations: usize,

    /// Adam learning rate
    #[config(default = "LEARNING_RATE")]
    pub learning_rate: f64,

    /// Fraction of the dataset held out for validation
    #[config(default = "VALIDATION_FRACTION")]
    pub validation_fraction: f64,

    /// Seed for shuffling, splitting and parameter initialization
    #[config(default = "42")]
    pub seed: u64,
}

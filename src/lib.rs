//! # Plant Disease Classification
//!
//! A small convolutional network for classifying plant-disease images from a
//! directory of per-class image folders, built on the Burn framework.
//!
//! ## Modules
//!
//! - `dataset`: class-folder discovery, image loading, train/validation splits
//! - `model`: the three-block CNN and its parameter initialization
//! - `training`: the iteration-based training loop with epoch checkpointing
//! - `utils`: logging and evaluation helpers
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plant_disease_classification::dataset::PlantDiseaseDataset;
//!
//! let dataset = PlantDiseaseDataset::new("datasets/train")?;
//! dataset.stats().print();
//! ```

pub mod backend;
pub mod dataset;
pub mod model;
pub mod training;
pub mod utils;

pub use dataset::batch::{ImageBatch, ImageBatcher, ImageItem};
pub use dataset::loader::PlantDiseaseDataset;
pub use dataset::split::{SplitSet, TrainValidSplit};
pub use model::cnn::{PlantClassifier, PlantClassifierConfig};
pub use training::trainer::{train, Learner, TrainContext, TrainSummary};
pub use training::TrainingConfig;
pub use utils::metrics::EpochReport;

/// Image edge size every input is resized to (square)
pub const IMAGE_SIZE: usize = 128;

/// Number of input channels (RGB)
pub const NUM_CHANNELS: usize = 3;

/// Training and validation batch size
pub const BATCH_SIZE: usize = 32;

/// Fraction of the dataset held out for validation
pub const VALIDATION_FRACTION: f64 = 0.2;

/// Adam learning rate
pub const LEARNING_RATE: f64 = 1e-4;

/// Total optimizer steps for a full training run
pub const NUM_ITERATIONS: usize = 3000;

/// Base filename for the parameter checkpoint (overwritten every epoch)
pub const CHECKPOINT_BASENAME: &str = "plant-disease-model";

/// Filename for the persisted class-label mapping
pub const LABELS_FILENAME: &str = "labels.json";

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

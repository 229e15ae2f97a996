//! Dataset module
//!
//! This module provides functionality for:
//! - Loading a plant-disease dataset from per-class image folders
//! - Deterministic class-index assignment (sorted directory names)
//! - Shuffled train/validation splits with a wrapping batch cursor
//! - Converting in-memory items into Burn tensor batches

pub mod batch;
pub mod loader;
pub mod split;

pub use batch::{ImageBatch, ImageBatcher, ImageItem};
pub use loader::{DatasetStats, ImageSample, PlantDiseaseDataset};
pub use split::{SplitSet, TrainValidSplit};

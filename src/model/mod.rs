//! Model module
//!
//! The fixed three-block CNN architecture and its parameter initialization.

pub mod cnn;
pub mod init;

pub use cnn::{PlantClassifier, PlantClassifierConfig};

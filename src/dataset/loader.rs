//! Dataset loader
//!
//! Reads a dataset laid out as one subdirectory per class, each holding the
//! image files for that class. Subdirectory names become class labels; they
//! are sorted lexicographically before index assignment so the class-index
//! mapping is a stable bijection across platforms and runs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::dataset::batch::ImageItem;
use crate::IMAGE_SIZE;

/// File extensions accepted as images
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// A single image file with its label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label index
    pub label: usize,
    /// Class name (the directory name, e.g. "Tomato___Late_blight")
    pub class_name: String,
}

/// Plant-disease dataset discovered from a class-folder directory
#[derive(Debug)]
pub struct PlantDiseaseDataset {
    /// Root directory of the dataset
    pub root_dir: PathBuf,
    /// All samples, grouped by class in class-index order
    pub samples: Vec<ImageSample>,
    /// Class names sorted lexicographically; position = class index
    pub classes: Vec<String>,
    /// Mapping from class name to label index
    pub class_to_idx: HashMap<String, usize>,
    /// Target image edge size (square)
    pub image_size: usize,
}

impl PlantDiseaseDataset {
    /// Discover a dataset from a directory
    ///
    /// The directory should be structured as:
    /// ```text
    /// root_dir/
    /// ├── Apple___Apple_scab/
    /// │   ├── image1.jpg
    /// │   └── image2.jpg
    /// ├── Apple___Black_rot/
    /// │   └── ...
    /// └── ...
    /// ```
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        info!("Loading dataset from: {:?}", root_dir);

        if !root_dir.exists() {
            anyhow::bail!("Dataset directory does not exist: {:?}", root_dir);
        }

        let mut classes: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&root_dir)
            .with_context(|| format!("Failed to read dataset directory {:?}", root_dir))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    classes.push(name.to_string());
                }
            }
        }
        // Directory listing order is platform-dependent; sort for a stable mapping.
        classes.sort();

        info!("Found {} classes", classes.len());

        let class_to_idx: HashMap<String, usize> = classes
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        let mut samples = Vec::new();
        for class_name in &classes {
            let class_dir = root_dir.join(class_name);
            let label = class_to_idx[class_name];
            let before = samples.len();

            for entry in WalkDir::new(&class_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path().to_path_buf();
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                        samples.push(ImageSample {
                            path,
                            label,
                            class_name: class_name.clone(),
                        });
                    }
                }
            }

            debug!(
                "Class '{}' (label {}): {} files",
                class_name,
                label,
                samples.len() - before
            );
        }

        info!("Discovered {} total samples", samples.len());

        Ok(Self {
            root_dir,
            samples,
            classes,
            class_to_idx,
            image_size: IMAGE_SIZE,
        })
    }

    /// Number of samples in the dataset
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset contains no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Class name for a label index
    pub fn class_name(&self, label: usize) -> Option<&str> {
        self.classes.get(label).map(|s| s.as_str())
    }

    /// Decode every image into memory as a normalized CHW tensor item.
    ///
    /// A single unreadable or undecodable file aborts the load; there is no
    /// partial-failure handling.
    pub fn load_items(&self) -> Result<Vec<ImageItem>> {
        info!(
            "Decoding {} images at {}x{}",
            self.samples.len(),
            self.image_size,
            self.image_size
        );

        self.samples
            .iter()
            .map(|s| ImageItem::from_path(&s.path, s.label, self.image_size))
            .collect()
    }

    /// Persist the class-label mapping as JSON (index = position in the array)
    pub fn save_labels<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.classes)?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write label mapping to {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Statistics about the dataset
    pub fn stats(&self) -> DatasetStats {
        let mut class_counts = vec![0usize; self.num_classes()];
        for sample in &self.samples {
            class_counts[sample.label] += 1;
        }

        DatasetStats {
            total_samples: self.samples.len(),
            num_classes: self.num_classes(),
            class_counts,
            class_names: self.classes.clone(),
        }
    }
}

/// Statistics about the dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_samples: usize,
    pub num_classes: usize,
    pub class_counts: Vec<usize>,
    pub class_names: Vec<String>,
}

impl DatasetStats {
    /// Print statistics to console
    pub fn print(&self) {
        println!("\nDataset Statistics:");
        println!("  Total samples: {}", self.total_samples);
        println!("  Number of classes: {}", self.num_classes);
        println!("\n  Samples per class:");

        for (idx, name) in self.class_names.iter().enumerate() {
            let count = self.class_counts[idx];
            let bar_len = if self.total_samples > 0 {
                (count as f32 / self.total_samples as f32 * 40.0) as usize
            } else {
                0
            };
            let bar: String = "█".repeat(bar_len);
            println!("    {:3}. {:40} {:5} {}", idx, name, count, bar);
        }
    }
}

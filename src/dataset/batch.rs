//! In-memory items and tensor batching
//!
//! Images are decoded once into flat CHW float arrays and held in memory for
//! the whole run; the batcher turns a slice of items into Burn tensors on the
//! target device.

use std::path::Path;

use anyhow::{Context, Result};
use burn::prelude::*;
use image::imageops::FilterType;
use image::ImageReader;

use crate::NUM_CHANNELS;

/// A single image ready for batching
#[derive(Clone, Debug)]
pub struct ImageItem {
    /// Image data as a flattened CHW float array [3 * H * W], scaled to [0, 1]
    pub image: Vec<f32>,
    /// Class label index
    pub label: usize,
    /// Source path (for diagnostics)
    pub path: String,
}

impl ImageItem {
    /// Load and preprocess an image file: decode, resize to `image_size`
    /// square, convert to CHW floats in [0, 1].
    pub fn from_path(path: &Path, label: usize, image_size: usize) -> Result<Self> {
        let img = ImageReader::open(path)
            .with_context(|| format!("Failed to open image: {:?}", path))?
            .decode()
            .with_context(|| format!("Failed to decode image: {:?}", path))?
            .resize_exact(image_size as u32, image_size as u32, FilterType::Triangle)
            .to_rgb8();

        let (width, height) = (image_size, image_size);
        let mut image = vec![0.0f32; NUM_CHANNELS * height * width];

        for y in 0..height {
            for x in 0..width {
                let pixel = img.get_pixel(x as u32, y as u32);
                for c in 0..NUM_CHANNELS {
                    image[c * height * width + y * width + x] = pixel[c] as f32 / 255.0;
                }
            }
        }

        Ok(Self {
            image,
            label,
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Create from pre-loaded image data
    pub fn from_data(image: Vec<f32>, label: usize, path: String) -> Self {
        Self { image, label, path }
    }
}

/// A batch of images for training or evaluation
#[derive(Clone, Debug)]
pub struct ImageBatch<B: Backend> {
    /// Images with shape [batch_size, 3, height, width]
    pub images: Tensor<B, 4>,
    /// Labels with shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> ImageBatch<B> {
    /// Number of examples in the batch
    pub fn len(&self) -> usize {
        self.targets.dims()[0]
    }

    /// Whether the batch is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Converts item slices into tensor batches on a fixed device
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    device: B::Device,
    image_size: usize,
}

impl<B: Backend> ImageBatcher<B> {
    /// Create a new batcher for the given device and image size
    pub fn new(device: B::Device, image_size: usize) -> Self {
        Self { device, image_size }
    }

    /// Build a batch from items. Panics if called with an empty slice; callers
    /// guard against empty splits before training starts.
    pub fn batch(&self, items: &[ImageItem]) -> ImageBatch<B> {
        let batch_size = items.len();
        let height = self.image_size;
        let width = self.image_size;

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();
        let images = Tensor::<B, 4>::from_data(
            TensorData::new(images_data, [batch_size, NUM_CHANNELS, height, width]),
            &self.device,
        );

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets =
            Tensor::<B, 1, Int>::from_data(TensorData::new(targets_data, [batch_size]), &self.device);

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;

    fn item(label: usize, size: usize, fill: f32) -> ImageItem {
        ImageItem::from_data(
            vec![fill; NUM_CHANNELS * size * size],
            label,
            format!("test_{label}.jpg"),
        )
    }

    #[test]
    fn test_item_from_data() {
        let it = item(5, 16, 0.5);
        assert_eq!(it.label, 5);
        assert_eq!(it.image.len(), 3 * 16 * 16);
    }

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let batcher = ImageBatcher::<DefaultBackend>::new(device, 16);

        let items = vec![item(0, 16, 0.1), item(1, 16, 0.9), item(2, 16, 0.4)];
        let batch = batcher.batch(&items);

        assert_eq!(batch.images.dims(), [3, 3, 16, 16]);
        assert_eq!(batch.targets.dims(), [3]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_batch_targets_preserve_order() {
        let device = Default::default();
        let batcher = ImageBatcher::<DefaultBackend>::new(device, 8);

        let items = vec![item(2, 8, 0.0), item(0, 8, 0.0), item(1, 8, 0.0)];
        let batch = batcher.batch(&items);

        let targets: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(targets, vec![2, 0, 1]);
    }
}

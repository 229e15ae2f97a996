//! CNN architecture for plant disease classification
//!
//! A fixed-topology network: three convolution blocks (3x3 filters, same
//! padding, 2x2 max pooling), a 128-unit fully-connected ReLU layer and a
//! linear output layer with one unit per class. Filter depths are 32, 32
//! and 64. All trainable parameters use the truncated-normal/constant
//! initialization from [`crate::model::init`].

use std::path::Path;

use anyhow::Result;
use burn::{
    config::Config,
    module::{Module, Param},
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::CrossEntropyLossConfig,
        pool::{MaxPool2d, MaxPool2dConfig},
        Linear, LinearConfig, PaddingConfig2d, Relu,
    },
    record::CompactRecorder,
    tensor::{backend::Backend, Int, Tensor},
};
use rand_chacha::ChaCha8Rng;

use crate::model::init::{constant_bias, truncated_normal, WEIGHT_STD};

/// Filter depths of the three convolution blocks
const CONV_FILTERS: [usize; 3] = [32, 32, 64];

/// Convolution kernel edge size
const KERNEL_SIZE: usize = 3;

/// Width of the fully-connected hidden layer
const FC_SIZE: usize = 128;

/// Configuration for the classifier
#[derive(Config, Debug)]
pub struct PlantClassifierConfig {
    /// Number of output classes
    pub num_classes: usize,

    /// Input image edge size (square)
    #[config(default = "128")]
    pub image_size: usize,

    /// Number of input channels (3 for RGB)
    #[config(default = "3")]
    pub in_channels: usize,
}

/// A convolution block: Conv2d (same padding) -> 2x2 MaxPool -> ReLU
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv: Conv2d<B>,
    pool: MaxPool2d,
    relu: Relu,
}

impl<B: Backend> ConvBlock<B> {
    fn new(
        in_channels: usize,
        out_channels: usize,
        device: &B::Device,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut conv = Conv2dConfig::new([in_channels, out_channels], [KERNEL_SIZE, KERNEL_SIZE])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        let weight = truncated_normal::<B, 4>(
            [out_channels, in_channels, KERNEL_SIZE, KERNEL_SIZE],
            WEIGHT_STD,
            rng,
            device,
        );
        conv.weight = Param::from_tensor(weight);
        conv.bias = Some(Param::from_tensor(constant_bias(out_channels, device)));

        let pool = MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init();

        Self {
            conv,
            pool,
            relu: Relu::new(),
        }
    }

    /// Forward pass through the block (pooling before the activation)
    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.conv.forward(x);
        let x = self.pool.forward(x);
        self.relu.forward(x)
    }
}

/// Plant disease classifier
///
/// Owns all trainable parameters; the training driver only talks to
/// `forward`, `loss`, `save` and `load`.
#[derive(Module, Debug)]
pub struct PlantClassifier<B: Backend> {
    conv1: ConvBlock<B>,
    conv2: ConvBlock<B>,
    conv3: ConvBlock<B>,
    fc1: Linear<B>,
    fc2: Linear<B>,
    num_classes: usize,
}

impl<B: Backend> PlantClassifier<B> {
    /// Build the network with freshly initialized parameters.
    ///
    /// All random draws go through `rng`, so a fixed seed reproduces the
    /// exact same parameter values.
    pub fn new(config: &PlantClassifierConfig, device: &B::Device, rng: &mut ChaCha8Rng) -> Self {
        let conv1 = ConvBlock::new(config.in_channels, CONV_FILTERS[0], device, rng);
        let conv2 = ConvBlock::new(CONV_FILTERS[0], CONV_FILTERS[1], device, rng);
        let conv3 = ConvBlock::new(CONV_FILTERS[1], CONV_FILTERS[2], device, rng);

        // Each block halves the spatial size (floor division for odd sizes).
        let mut edge = config.image_size;
        for _ in &CONV_FILTERS {
            edge /= 2;
        }
        let num_features = edge * edge * CONV_FILTERS[2];

        let mut fc1 = LinearConfig::new(num_features, FC_SIZE).init(device);
        fc1.weight = Param::from_tensor(truncated_normal::<B, 2>(
            [num_features, FC_SIZE],
            WEIGHT_STD,
            rng,
            device,
        ));
        fc1.bias = Some(Param::from_tensor(constant_bias(FC_SIZE, device)));

        let mut fc2 = LinearConfig::new(FC_SIZE, config.num_classes).init(device);
        fc2.weight = Param::from_tensor(truncated_normal::<B, 2>(
            [FC_SIZE, config.num_classes],
            WEIGHT_STD,
            rng,
            device,
        ));
        fc2.bias = Some(Param::from_tensor(constant_bias(config.num_classes, device)));

        Self {
            conv1,
            conv2,
            conv3,
            fc1,
            fc2,
            num_classes: config.num_classes,
        }
    }

    /// Forward pass producing logits of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.conv1.forward(x);
        let x = self.conv2.forward(x);
        let x = self.conv3.forward(x);

        // Flatten: [B, C, H, W] -> [B, C * H * W]
        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        let x = self.fc1.forward(x);
        let x = Relu::new().forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass with softmax, producing class probabilities
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let logits = self.forward(x);
        burn::tensor::activation::softmax(logits, 1)
    }

    /// Mean softmax cross-entropy between logits and integer class targets
    pub fn loss(&self, logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets)
    }

    /// Save all parameters to `path` (Burn appends the recorder extension),
    /// overwriting any previous snapshot.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let recorder = CompactRecorder::new();
        self.clone()
            .save_file(path.as_ref().to_path_buf(), &recorder)
            .map_err(|e| anyhow::anyhow!("Failed to save model: {:?}", e))?;
        Ok(())
    }

    /// Load parameters from a snapshot written by [`Self::save`]
    pub fn load<P: AsRef<Path>>(self, path: P, device: &B::Device) -> Result<Self> {
        let recorder = CompactRecorder::new();
        self.load_file(path.as_ref().to_path_buf(), &recorder, device)
            .map_err(|e| anyhow::anyhow!("Failed to load model: {:?}", e))
    }

    /// Number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;
    use rand::SeedableRng;

    fn small_config() -> PlantClassifierConfig {
        PlantClassifierConfig::new(4)
            .with_image_size(32)
            .with_in_channels(3)
    }

    #[test]
    fn test_forward_output_shape() {
        let device = Default::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let model = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng);

        let input = Tensor::<DefaultBackend, 4>::zeros([2, 3, 32, 32], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 4]);
    }

    #[test]
    fn test_softmax_rows_are_distributions() {
        let device = Default::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let model = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng);

        let input = Tensor::<DefaultBackend, 4>::ones([2, 3, 32, 32], &device);
        let probs: Vec<f32> = model.forward_softmax(input).into_data().to_vec().unwrap();

        for row in probs.chunks(4) {
            let sum: f32 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert!(row.iter().all(|&p| (0.0..=1.0).contains(&p)));
        }
    }

    #[test]
    fn test_initialization_reproducible_for_fixed_seed() {
        let device = Default::default();

        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let model_a = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng_a);

        let mut rng_b = ChaCha8Rng::seed_from_u64(42);
        let model_b = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng_b);

        let weights_a: Vec<f32> = model_a.fc2.weight.val().into_data().to_vec().unwrap();
        let weights_b: Vec<f32> = model_b.fc2.weight.val().into_data().to_vec().unwrap();
        assert_eq!(weights_a, weights_b);

        let conv_a: Vec<f32> = model_a.conv1.conv.weight.val().into_data().to_vec().unwrap();
        let conv_b: Vec<f32> = model_b.conv1.conv.weight.val().into_data().to_vec().unwrap();
        assert_eq!(conv_a, conv_b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let device = Default::default();

        let mut rng_a = ChaCha8Rng::seed_from_u64(1);
        let model_a = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng_a);

        let mut rng_b = ChaCha8Rng::seed_from_u64(2);
        let model_b = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng_b);

        let weights_a: Vec<f32> = model_a.fc2.weight.val().into_data().to_vec().unwrap();
        let weights_b: Vec<f32> = model_b.fc2.weight.val().into_data().to_vec().unwrap();
        assert_ne!(weights_a, weights_b);
    }

    #[test]
    fn test_loss_is_non_negative() {
        let device = Default::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let model = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng);

        let input = Tensor::<DefaultBackend, 4>::ones([4, 3, 32, 32], &device);
        let logits = model.forward(input);
        let targets = Tensor::<DefaultBackend, 1, Int>::from_ints([0, 1, 2, 3], &device);

        let loss: f32 = model.loss(logits, targets).into_scalar();
        assert!(loss >= 0.0);
        assert!(loss.is_finite());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let device = Default::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model-test");

        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let model = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng);
        model.save(&path).unwrap();

        let mut rng2 = ChaCha8Rng::seed_from_u64(99);
        let other = PlantClassifier::<DefaultBackend>::new(&small_config(), &device, &mut rng2);
        let restored = other.load(&path, &device).unwrap();

        let original: Vec<f32> = model.fc1.weight.val().into_data().to_vec().unwrap();
        let loaded: Vec<f32> = restored.fc1.weight.val().into_data().to_vec().unwrap();
        assert_eq!(original, loaded);
    }
}

//! Supervised training loop
//!
//! The driver trains for a fixed number of optimizer steps rather than a
//! fixed number of epochs. An "epoch boundary" is any iteration index that is
//! a multiple of `train_len / batch_size`; at each boundary the current model
//! is evaluated on the in-flight training and validation batches, a progress
//! line is printed and the checkpoint is overwritten.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::{
    dataset::{
        batch::{ImageBatch, ImageBatcher, ImageItem},
        loader::PlantDiseaseDataset,
        split::TrainValidSplit,
    },
    model::cnn::{PlantClassifier, PlantClassifierConfig},
    training::TrainingConfig,
    utils::metrics::{accuracy, EpochReport},
    CHECKPOINT_BASENAME,
};

/// Mutable bookkeeping for a training run.
///
/// Carried explicitly through the loop so that iteration counting is owned by
/// the run, not by shared state.
#[derive(Debug, Clone, Default)]
pub struct TrainContext {
    total_iterations: usize,
}

impl TrainContext {
    /// Start a fresh context with zero completed iterations
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed optimizer step
    pub fn advance(&mut self) {
        self.total_iterations += 1;
    }

    /// Number of optimizer steps completed so far
    pub fn total_iterations(&self) -> usize {
        self.total_iterations
    }
}

/// Model plus optimizer state for gradient steps
pub struct Learner<B: AutodiffBackend, O> {
    model: PlantClassifier<B>,
    optimizer: O,
    learning_rate: f64,
}

impl<B, O> Learner<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<PlantClassifier<B>, B>,
{
    pub fn new(model: PlantClassifier<B>, optimizer: O, learning_rate: f64) -> Self {
        Self {
            model,
            optimizer,
            learning_rate,
        }
    }

    /// Run one optimizer step on a batch and return the batch loss.
    pub fn step(&mut self, batch: &ImageBatch<B>) -> f64 {
        let logits = self.model.forward(batch.images.clone());
        let loss = self.model.loss(logits, batch.targets.clone());

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.model);
        self.model = self
            .optimizer
            .step(self.learning_rate, self.model.clone(), grads);

        loss.into_scalar().elem::<f64>()
    }

    /// The current model
    pub fn model(&self) -> &PlantClassifier<B> {
        &self.model
    }

    /// Consume the learner, yielding the trained model
    pub fn into_model(self) -> PlantClassifier<B> {
        self.model
    }
}

/// Outcome of a full training run
#[derive(Debug, Clone)]
pub struct TrainSummary {
    /// One report per epoch boundary, in order
    pub epochs: Vec<EpochReport>,
    /// Total optimizer steps executed
    pub total_iterations: usize,
    /// Path stem of the final checkpoint (recorder adds its extension)
    pub checkpoint_path: PathBuf,
}

/// Accuracy and mean loss of `model` on one batch of items, without autodiff.
fn evaluate<B: AutodiffBackend>(
    model: &PlantClassifier<B::InnerBackend>,
    batcher: &ImageBatcher<B::InnerBackend>,
    items: &[ImageItem],
) -> (f64, f64) {
    let batch = batcher.batch(items);
    let logits = model.forward(batch.images);

    let loss = model
        .loss(logits.clone(), batch.targets.clone())
        .into_scalar()
        .elem::<f64>();
    let acc = accuracy(logits, batch.targets);

    (acc, loss)
}

/// Train a classifier on `dataset` and checkpoint it under the configured
/// output directory.
///
/// The dataset is split once (seeded); training then draws one training and
/// one validation batch per iteration. The checkpoint file keeps the same
/// name for the whole run, so each save replaces the previous one. The
/// caller owns `context`, so repeated calls keep counting iterations from
/// where the previous run stopped.
pub fn train<B: AutodiffBackend>(
    dataset: &PlantDiseaseDataset,
    config: &TrainingConfig,
    device: &B::Device,
    context: &mut TrainContext,
) -> Result<TrainSummary> {
    if dataset.image_size != config.image_size {
        bail!(
            "Image size mismatch: dataset decodes at {} but training is configured for {}",
            dataset.image_size,
            config.image_size
        );
    }

    let items = dataset.load_items()?;
    if items.is_empty() {
        bail!("Dataset is empty, nothing to train on");
    }

    let mut split = TrainValidSplit::new(items, config.validation_fraction, config.seed);
    if split.train.is_empty() || split.valid.is_empty() {
        bail!(
            "Dataset too small to split: {} training / {} validation items",
            split.train.len(),
            split.valid.len()
        );
    }

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", config.output_dir))?;
    let checkpoint_path = Path::new(&config.output_dir).join(CHECKPOINT_BASENAME);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let model_config = PlantClassifierConfig::new(config.num_classes)
        .with_image_size(config.image_size)
        .with_in_channels(crate::NUM_CHANNELS);
    let model = PlantClassifier::<B>::new(&model_config, device, &mut rng);

    let optimizer = AdamConfig::new().init();
    let mut learner = Learner::new(model, optimizer, config.learning_rate);

    let batcher = ImageBatcher::<B>::new(device.clone(), config.image_size);
    let eval_batcher = ImageBatcher::<B::InnerBackend>::new(device.clone(), config.image_size);

    let iters_per_epoch = (split.train.len() / config.batch_size).max(1);
    info!(
        "Starting training: {} iterations, {} per epoch, batch size {}",
        config.num_iterations, iters_per_epoch, config.batch_size
    );

    let mut epochs = Vec::new();

    // Iteration indices are global: a second run sharing the context picks
    // up where the previous one stopped, so epoch boundaries and epoch
    // numbers continue instead of restarting.
    let start = context.total_iterations();
    for i in start..start + config.num_iterations {
        let train_items = split.train.next_batch(config.batch_size);
        let valid_items = split.valid.next_batch(config.batch_size);

        if i % iters_per_epoch == 0 {
            let eval_model = learner.model().valid();
            let (train_acc, _) = evaluate::<B>(&eval_model, &eval_batcher, &train_items);
            let (valid_acc, valid_loss) = evaluate::<B>(&eval_model, &eval_batcher, &valid_items);

            let report = EpochReport {
                epoch: i / iters_per_epoch + 1,
                train_accuracy: train_acc,
                valid_accuracy: valid_acc,
                valid_loss,
            };
            println!("{report}");

            learner.model().save(&checkpoint_path)?;
            epochs.push(report);
        }

        let batch = batcher.batch(&train_items);
        let loss = learner.step(&batch);
        context.advance();

        debug!(iteration = i, loss, "optimizer step");
    }

    learner.model().save(&checkpoint_path)?;
    info!(
        "Training complete after {} iterations, checkpoint at {:?}",
        context.total_iterations(),
        checkpoint_path
    );

    Ok(TrainSummary {
        epochs,
        total_iterations: context.total_iterations(),
        checkpoint_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::TrainingBackend;
    use crate::NUM_CHANNELS;

    fn synthetic_items(per_class: usize, size: usize) -> Vec<ImageItem> {
        let mut items = Vec::new();
        for class in 0..2 {
            for i in 0..per_class {
                // Class 0 dark, class 1 bright, so the task is learnable
                let fill = if class == 0 { 0.1 } else { 0.9 };
                items.push(ImageItem::from_data(
                    vec![fill; NUM_CHANNELS * size * size],
                    class,
                    format!("class{class}_{i}.png"),
                ));
            }
        }
        items
    }

    fn small_model(size: usize) -> PlantClassifier<TrainingBackend> {
        let device = Default::default();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let config = PlantClassifierConfig::new(2).with_image_size(size);
        PlantClassifier::new(&config, &device, &mut rng)
    }

    #[test]
    fn test_train_context_counts_iterations() {
        let mut context = TrainContext::new();
        assert_eq!(context.total_iterations(), 0);
        for _ in 0..5 {
            context.advance();
        }
        assert_eq!(context.total_iterations(), 5);
    }

    #[test]
    fn test_learner_step_returns_finite_loss() {
        let device = Default::default();
        let model = small_model(16);
        let mut learner = Learner::new(model, AdamConfig::new().init(), 1e-4);

        let batcher = ImageBatcher::<TrainingBackend>::new(device, 16);
        let batch = batcher.batch(&synthetic_items(4, 16)[..4]);

        let loss = learner.step(&batch);
        assert!(loss.is_finite());
        assert!(loss >= 0.0);
    }

    #[test]
    fn test_learner_step_updates_parameters() {
        let device = Default::default();
        let model = small_model(16);
        let before: Vec<f32> = model
            .clone()
            .valid()
            .forward(burn::tensor::Tensor::ones([1, 3, 16, 16], &device))
            .into_data()
            .to_vec()
            .unwrap();

        let mut learner = Learner::new(model, AdamConfig::new().init(), 1e-2);
        let batcher = ImageBatcher::<TrainingBackend>::new(device, 16);
        let batch = batcher.batch(&synthetic_items(4, 16));
        learner.step(&batch);

        let after: Vec<f32> = learner
            .model()
            .valid()
            .forward(burn::tensor::Tensor::ones([1, 3, 16, 16], &Default::default()))
            .into_data()
            .to_vec()
            .unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_evaluate_accuracy_in_bounds() {
        let model = small_model(16).valid();
        let batcher = ImageBatcher::new(Default::default(), 16);
        let items = synthetic_items(3, 16);

        let (acc, loss) = evaluate::<TrainingBackend>(&model, &batcher, &items);
        assert!((0.0..=1.0).contains(&acc));
        assert!(loss.is_finite());
    }
}

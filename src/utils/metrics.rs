//! Evaluation metrics and epoch progress reporting.

use std::fmt;

use burn::prelude::*;
use burn::tensor::ElementConversion;

/// Classification accuracy as a fraction in [0, 1].
///
/// `output` holds logits or probabilities of shape [batch_size, num_classes];
/// the prediction is the argmax of each row. Returns 0.0 for an empty batch.
pub fn accuracy<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> f64 {
    let total = targets.dims()[0];
    if total == 0 {
        return 0.0;
    }

    let predictions = output.argmax(1).squeeze::<1>(1);
    let correct = predictions
        .equal(targets)
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();

    correct as f64 / total as f64
}

/// Snapshot of training progress at an epoch boundary
#[derive(Debug, Clone, PartialEq)]
pub struct EpochReport {
    /// 1-based epoch number
    pub epoch: usize,
    /// Accuracy on the current training batch, in [0, 1]
    pub train_accuracy: f64,
    /// Accuracy on the current validation batch, in [0, 1]
    pub valid_accuracy: f64,
    /// Mean cross-entropy loss on the current validation batch
    pub valid_loss: f64,
}

impl fmt::Display for EpochReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Training Epoch {} --- Training Accuracy: {:>5.1}%, Validation Accuracy: {:>5.1}%,  Validation Loss: {:.3}",
            self.epoch,
            self.train_accuracy * 100.0,
            self.valid_accuracy * 100.0,
            self.valid_loss,
        )
    }
}

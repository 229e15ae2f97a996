//! Train/validation split and batch cursor
//!
//! The whole dataset is shuffled once with a seeded RNG, then partitioned:
//! the first `floor(total * fraction)` items become the validation set, the
//! rest the training set. Each split owns a cursor that hands out batches in
//! shuffled order, reshuffling and wrapping when a pass completes.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::dataset::batch::ImageItem;

/// One split of the dataset with a wrapping, reshuffling batch cursor
#[derive(Debug, Clone)]
pub struct SplitSet {
    items: Vec<ImageItem>,
    order: Vec<usize>,
    cursor: usize,
    rng: ChaCha8Rng,
}

impl SplitSet {
    /// Create a split over the given items with a seeded batch order
    pub fn new(items: Vec<ImageItem>, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.shuffle(&mut rng);

        Self {
            items,
            order,
            cursor: 0,
            rng,
        }
    }

    /// Number of items in the split
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the split is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in storage order
    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    /// Draw the next batch of at most `batch_size` items.
    ///
    /// The final batch of a pass may be short; when a pass over the split
    /// completes, the order is reshuffled and the cursor wraps to the start.
    /// Within `ceil(len / batch_size)` draws from a fresh cursor, every item
    /// appears at least once.
    pub fn next_batch(&mut self, batch_size: usize) -> Vec<ImageItem> {
        if self.items.is_empty() || batch_size == 0 {
            return Vec::new();
        }

        if self.cursor >= self.order.len() {
            self.order.shuffle(&mut self.rng);
            self.cursor = 0;
        }

        let end = (self.cursor + batch_size).min(self.order.len());
        let batch = self.order[self.cursor..end]
            .iter()
            .map(|&i| self.items[i].clone())
            .collect();
        self.cursor = end;

        batch
    }
}

/// The two dataset splits used by the training loop
#[derive(Debug, Clone)]
pub struct TrainValidSplit {
    pub train: SplitSet,
    pub valid: SplitSet,
}

impl TrainValidSplit {
    /// Shuffle `items` with the given seed and partition them.
    ///
    /// Validation takes the first `floor(items.len() * validation_fraction)`
    /// items of the shuffled order; training takes the rest.
    pub fn new(mut items: Vec<ImageItem>, validation_fraction: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        items.shuffle(&mut rng);

        let validation_size = (items.len() as f64 * validation_fraction) as usize;
        let train_items = items.split_off(validation_size);
        let valid_items = items;

        info!(
            "Split dataset: {} training / {} validation",
            train_items.len(),
            valid_items.len()
        );

        Self {
            // Offset the seeds so the two cursors do not mirror each other.
            train: SplitSet::new(train_items, seed.wrapping_add(1)),
            valid: SplitSet::new(valid_items, seed.wrapping_add(2)),
        }
    }
}

//! Train/validation split and mini-batching.
//!
//! [`Partition::random_split`] assigns every sample index to exactly one of
//! two subsets. [`batches`] then walks a subset in fixed-size batches, either
//! in order (validation, evaluation) or in a fresh random order per call
//! (training).

use lbw_data::{feature::FeatureVector, sample::Dataset};
use rand::{Rng, seq::SliceRandom as _};

/// Default fraction of samples assigned to the training subset.
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;

/// Default number of samples per batch.
pub const DEFAULT_BATCH_SIZE: usize = 32;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("train fraction must lie in [0, 1], got {fraction}")]
pub struct InvalidFractionError {
    fraction: f64,
}

/// Disjoint index subsets that together cover a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

impl Partition {
    /// Shuffles `0..len` and splits it after `floor(train_fraction * len)`
    /// indices.
    ///
    /// # Errors
    ///
    /// Returns an error if `train_fraction` is outside `[0, 1]`.
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn random_split<R>(
        len: usize,
        train_fraction: f64,
        rng: &mut R,
    ) -> Result<Self, InvalidFractionError>
    where
        R: Rng + ?Sized,
    {
        if !(0.0..=1.0).contains(&train_fraction) {
            return Err(InvalidFractionError {
                fraction: train_fraction,
            });
        }
        let train_len = ((train_fraction * len as f64).floor() as usize).min(len);

        let mut indices = (0..len).collect::<Vec<_>>();
        indices.shuffle(rng);
        let validation = indices.split_off(train_len);
        Ok(Self {
            train: indices,
            validation,
        })
    }
}

/// Features and 0/1 targets of one batch, row-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub features: Vec<FeatureVector>,
    pub targets: Vec<f32>,
}

impl Batch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Splits `indices` into batches of `batch_size` samples from `dataset`.
///
/// When `shuffle` is `Some`, the visiting order is re-randomized with the
/// given RNG; otherwise `indices` order is kept. Only the last batch may be
/// smaller than `batch_size`.
///
/// # Panics
///
/// Panics if `batch_size` is zero or an index is out of bounds.
pub fn batches<R>(
    dataset: &Dataset,
    indices: &[usize],
    batch_size: usize,
    shuffle: Option<&mut R>,
) -> Vec<Batch>
where
    R: Rng + ?Sized,
{
    assert!(batch_size > 0, "batch size must be positive");
    let mut order = indices.to_vec();
    if let Some(rng) = shuffle {
        order.shuffle(rng);
    }
    let samples = dataset.samples();
    order
        .chunks(batch_size)
        .map(|chunk| Batch {
            features: chunk.iter().map(|&i| samples[i].features).collect(),
            targets: chunk.iter().map(|&i| samples[i].target()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use lbw_data::sample::Sample;
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn numbered(len: usize) -> Dataset {
        (0..len)
            .map(|i| {
                let mut features = [0.0; 13];
                features[0] = f32::from(u16::try_from(i).unwrap());
                Sample::new(features, i % 3 == 0)
            })
            .collect()
    }

    #[test]
    fn test_split_sizes() {
        let mut rng = Pcg32::seed_from_u64(0);
        let partition = Partition::random_split(100, 0.8, &mut rng).unwrap();
        assert_eq!(partition.train.len(), 80);
        assert_eq!(partition.validation.len(), 20);

        let partition = Partition::random_split(7, 0.8, &mut rng).unwrap();
        assert_eq!(partition.train.len(), 5);
        assert_eq!(partition.validation.len(), 2);
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = Partition::random_split(50, 0.8, &mut Pcg32::seed_from_u64(9)).unwrap();
        let b = Partition::random_split(50, 0.8, &mut Pcg32::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_fraction() {
        let mut rng = Pcg32::seed_from_u64(0);
        assert!(Partition::random_split(10, 1.5, &mut rng).is_err());
        assert!(Partition::random_split(10, -0.1, &mut rng).is_err());
        assert!(Partition::random_split(10, f64::NAN, &mut rng).is_err());
    }

    #[test]
    fn test_ordered_batches() {
        let dataset = numbered(10);
        let indices = (0..10).collect::<Vec<_>>();
        let batches = batches::<Pcg32>(&dataset, &indices, 4, None);
        let sizes = batches.iter().map(Batch::len).collect::<Vec<_>>();
        assert_eq!(sizes, [4, 4, 2]);

        let order = batches
            .iter()
            .flat_map(|b| b.features.iter().map(|f| f[0]))
            .collect::<Vec<_>>();
        assert_eq!(order, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(batches[0].targets, [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_shuffled_batches_keep_rows_aligned() {
        let dataset = numbered(30);
        let indices = (0..30).collect::<Vec<_>>();
        let mut rng = Pcg32::seed_from_u64(1);
        let batches = batches(&dataset, &indices, 8, Some(&mut rng));

        let mut seen = vec![];
        for batch in &batches {
            for (features, &target) in batch.features.iter().zip(&batch.targets) {
                #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let i = features[0] as usize;
                assert_eq!(target, dataset.samples()[i].target());
                seen.push(i);
            }
        }
        assert_ne!(seen, indices);
        seen.sort_unstable();
        assert_eq!(seen, indices);
    }

    proptest! {
        #[test]
        fn test_split_is_disjoint_cover(
            len in 0usize..500,
            fraction in 0.0f64..=1.0,
            seed in any::<u64>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let partition = Partition::random_split(len, fraction, &mut rng).unwrap();
            prop_assert_eq!(partition.train.len() + partition.validation.len(), len);

            let mut all = partition.train.clone();
            all.extend(&partition.validation);
            all.sort_unstable();
            prop_assert_eq!(all, (0..len).collect::<Vec<_>>());
        }

        #[test]
        fn test_only_last_batch_is_short(
            len in 1usize..200,
            batch_size in 1usize..40,
        ) {
            let dataset = numbered(len);
            let indices = (0..len).collect::<Vec<_>>();
            let batches = batches::<Pcg32>(&dataset, &indices, batch_size, None);
            let (last, full) = batches.split_last().unwrap();
            prop_assert!(full.iter().all(|b| b.len() == batch_size));
            prop_assert!(!last.is_empty() && last.len() <= batch_size);
            prop_assert_eq!(batches.iter().map(Batch::len).sum::<usize>(), len);
        }
    }
}

/// Descriptive statistics summarizing a dataset.
///
/// This structure contains the measures of central tendency and dispersion
/// used by the feature scaler and the dataset summaries. Accumulation is done
/// in `f64` so that large datasets of `f32` samples keep their precision.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// The number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f32,
    /// The maximum value in the dataset.
    pub max: f32,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f32,
    /// The population variance of the dataset (divides by `n`, not `n - 1`).
    pub variance: f32,
    /// The population standard deviation of the dataset.
    pub std_dev: f32,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from values in any order.
    ///
    /// The variance is the population variance, matching the convention of
    /// standardization transforms (`z = (x - mean) / std_dev`).
    ///
    /// # Arguments
    ///
    /// * `values` - An iterator over `f32` values.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use lbw_stats::descriptive::DescriptiveStats;
    /// let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 2.0);
    /// assert_eq!(stats.max, 9.0);
    /// assert_eq!(stats.mean, 5.0);
    /// assert_eq!(stats.std_dev, 2.0);
    /// ```
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f32>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        let count = values.len();
        if count == 0 {
            return None;
        }

        let n = count as f64;
        let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / n;
        // Two-pass variance avoids the cancellation of the sum-of-squares formula
        let variance = values
            .iter()
            .map(|&v| (f64::from(v) - mean).powi(2))
            .sum::<f64>()
            / n;
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        Some(Self {
            count,
            min,
            max,
            mean: mean as f32,
            variance: variance as f32,
            std_dev: variance.sqrt() as f32,
        })
    }

    /// Returns `true` if every value in the dataset is identical.
    #[must_use]
    #[expect(clippy::float_cmp)]
    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(std::iter::empty()).is_none());
    }

    #[test]
    fn test_single_value() {
        let stats = DescriptiveStats::new([3.5]).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.min, 3.5);
        assert_eq!(stats.max, 3.5);
        assert_eq!(stats.mean, 3.5);
        assert_eq!(stats.std_dev, 0.0);
        assert!(stats.is_constant());
    }

    #[test]
    fn test_population_variance() {
        // Sample variance would be 2.5, population variance is 2.0
        let stats = DescriptiveStats::new([1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((stats.variance - 2.0).abs() < 1e-6);
        assert!((stats.std_dev - 2.0_f32.sqrt()).abs() < 1e-6);
        assert!(!stats.is_constant());
    }

    #[test]
    fn test_large_offset_keeps_precision() {
        let values = (0..1000).map(|i| 1.0e4 + if i % 2 == 0 { 1.0 } else { -1.0 });
        let stats = DescriptiveStats::new(values).unwrap();
        assert!((stats.mean - 1.0e4).abs() < 1e-3);
        assert!((stats.std_dev - 1.0).abs() < 1e-4);
    }
}

use std::ops::Range;

/// A histogram representation of a dataset's distribution.
///
/// The histogram divides an explicit range into equal-width bins and counts
/// the values falling into each bin. Values outside the range are counted in
/// [`Histogram::out_of_range`] rather than being clamped into the edge bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
    /// The number of values that fell outside the histogram range.
    pub out_of_range: u64,
}

/// A single bin in a histogram.
///
/// Each bin represents a range of values and the count of data points falling within that range.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    ///
    /// The last bin also contains values equal to the end of the histogram range.
    pub range: Range<f32>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram with `num_bins` equal-width bins covering `range`.
    ///
    /// The upper bound of `range` is included in the last bin, so a histogram
    /// over `0.0..1.0` counts a probability of exactly `1.0`.
    ///
    /// # Arguments
    ///
    /// * `values` - The data points to count.
    /// * `num_bins` - The number of bins to create.
    /// * `range` - The covered value range. Must be non-empty.
    ///
    /// # Returns
    ///
    /// A `Histogram` with bins populated based on the input values. If
    /// `num_bins` is zero or the range is empty, the histogram has no bins and
    /// every value is counted as out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// # use lbw_stats::histogram::Histogram;
    /// let histogram = Histogram::with_range([0.0, 0.5, 1.0, 1.5], 2, 0.0..1.0);
    /// assert_eq!(histogram.bins[0].count, 1);
    /// assert_eq!(histogram.bins[1].count, 2);
    /// assert_eq!(histogram.out_of_range, 1);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn with_range<I>(values: I, num_bins: usize, range: Range<f32>) -> Self
    where
        I: IntoIterator<Item = f32>,
    {
        if num_bins == 0 || range.is_empty() {
            let out_of_range = values.into_iter().count() as u64;
            return Self {
                bins: vec![],
                out_of_range,
            };
        }

        let width = (range.end - range.start) / num_bins as f32;
        let mut bins = (0..num_bins)
            .map(|i| {
                // Recompute boundaries from the index to avoid accumulating rounding error
                let start = range.start + (i as f32) * width;
                let end = if i + 1 == num_bins {
                    range.end
                } else {
                    range.start + ((i + 1) as f32) * width
                };
                HistogramBin {
                    range: start..end,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        let mut out_of_range = 0;
        for value in values {
            if !(range.start..=range.end).contains(&value) {
                out_of_range += 1;
                continue;
            }
            let idx = (((value - range.start) / width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins, out_of_range }
    }

    /// Returns the total number of values counted in the bins.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}

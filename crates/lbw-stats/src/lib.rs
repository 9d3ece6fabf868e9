//! Statistical utilities shared by the LBW pipeline.
//!
//! This crate provides the small set of statistical tools the pipeline needs:
//!
//! - **Descriptive statistics**: count, min, max, mean, population variance and
//!   standard deviation. Used to fit the feature scaler and to summarize
//!   datasets.
//! - **Histograms**: fixed-range, equal-width binning. Used to summarize
//!   predicted probability distributions for the evaluation report.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`histogram`]: Equal-width histograms over an explicit range
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use lbw_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Creating a histogram
//!
//! ```
//! use lbw_stats::histogram::Histogram;
//!
//! let values = [0.05, 0.15, 0.15, 0.95];
//! let histogram = Histogram::with_range(values, 10, 0.0..1.0);
//! assert_eq!(histogram.bins[1].count, 2);
//! ```

pub mod descriptive;
pub mod histogram;

//! Binary cross-entropy.

/// Lower bound applied to `ln(p)` and `ln(1 - p)`.
///
/// Keeps the loss finite when a probability saturates at exactly 0 or 1.
pub const LOG_FLOOR: f32 = -100.0;

/// Mean binary cross-entropy of `probabilities` against 0/1 `targets`.
///
/// Returns `0.0` for an empty batch.
///
/// # Panics
///
/// Panics if the slices differ in length.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn binary_cross_entropy(probabilities: &[f32], targets: &[f32]) -> f32 {
    assert_eq!(probabilities.len(), targets.len());
    if probabilities.is_empty() {
        return 0.0;
    }
    let total = probabilities
        .iter()
        .zip(targets)
        .map(|(&p, &y)| {
            let log_p = p.ln().max(LOG_FLOOR);
            let log_not_p = (1.0 - p).ln().max(LOG_FLOOR);
            -(y * log_p + (1.0 - y) * log_not_p)
        })
        .sum::<f32>();
    total / probabilities.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        let loss = binary_cross_entropy(&[0.5], &[1.0]);
        assert!((loss - std::f32::consts::LN_2).abs() < 1e-6);

        let loss = binary_cross_entropy(&[0.9, 0.2], &[1.0, 0.0]);
        let expected = -(0.9f32.ln() + 0.8f32.ln()) / 2.0;
        assert!((loss - expected).abs() < 1e-6);
    }

    #[test]
    fn test_saturated_probabilities_stay_finite() {
        assert_eq!(binary_cross_entropy(&[0.0], &[1.0]), 100.0);
        assert_eq!(binary_cross_entropy(&[1.0], &[0.0]), 100.0);
        assert_eq!(binary_cross_entropy(&[1.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_empty_batch() {
        assert_eq!(binary_cross_entropy(&[], &[]), 0.0);
    }
}

//! First-layer weight magnitude as a coarse feature importance.

use lbw_data::feature::FeatureId;
use serde::Serialize;

use crate::network::Network;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: FeatureId,
    /// Mean absolute weight from this input to the first hidden layer.
    pub importance: f32,
}

/// Ranks input features by mean absolute first-layer weight, highest first.
///
/// Ties keep feature order. Inputs are standardized before they reach the
/// network, so the weights are comparable across features.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn feature_importance(network: &Network) -> Vec<FeatureImportance> {
    let first = &network.layers()[0];
    let n_in = first.in_features();
    let rows = first.out_features() as f32;

    let mut totals = vec![0.0f32; n_in];
    for row in first.weight().chunks_exact(n_in) {
        for (total, w) in totals.iter_mut().zip(row) {
            *total += w.abs();
        }
    }

    let mut ranked = FeatureId::ALL
        .into_iter()
        .zip(totals)
        .map(|(feature, total)| FeatureImportance {
            feature,
            importance: total / rows,
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_ranking_is_sorted_and_complete() {
        let network = Network::random(&mut Pcg32::seed_from_u64(3));
        let ranked = feature_importance(&network);
        assert_eq!(ranked.len(), FeatureId::ALL.len());
        assert!(ranked.windows(2).all(|w| w[0].importance >= w[1].importance));

        let mut features = ranked.iter().map(|r| r.feature).collect::<Vec<_>>();
        features.sort();
        assert_eq!(features, FeatureId::ALL);
    }

    #[test]
    fn test_dominant_input_ranks_first() {
        let mut network = Network::random(&mut Pcg32::seed_from_u64(4));
        let speed = FeatureId::Speed.index();
        let first_weights = network.parameters_mut().next().unwrap();
        for row in first_weights.chunks_exact_mut(FeatureId::ALL.len()) {
            row[speed] = 10.0;
        }
        let ranked = feature_importance(&network);
        assert_eq!(ranked[0].feature, FeatureId::Speed);
        assert!((ranked[0].importance - 10.0).abs() < 1e-5);
    }
}

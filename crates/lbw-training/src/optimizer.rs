//! Adam optimizer over flat parameter buffers.

use lbw_model::network::{Gradients, Network};

/// Adam hyper-parameters and moment estimates.
///
/// Moments are kept per parameter buffer, in [`Network::parameters_mut`]
/// order. Each update uses bias-corrected moments:
///
/// ```text
/// m = β1·m + (1-β1)·g
/// v = β2·v + (1-β2)·g²
/// θ -= lr · (m / (1-β1^t)) / (√(v / (1-β2^t)) + ε)
/// ```
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: i32,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
}

impl Adam {
    /// Creates an optimizer with zeroed moments shaped like `network`'s
    /// parameters and the usual defaults `β1 = 0.9`, `β2 = 0.999`,
    /// `ε = 1e-8`.
    #[must_use]
    pub fn new(network: &mut Network, learning_rate: f32) -> Self {
        let zeros = network
            .parameters_mut()
            .map(|p| vec![0.0; p.len()])
            .collect::<Vec<_>>();
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 0,
            m: zeros.clone(),
            v: zeros,
        }
    }

    #[must_use]
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// Number of updates applied so far.
    #[must_use]
    pub fn steps(&self) -> i32 {
        self.t
    }

    /// Applies one update step.
    pub fn step(&mut self, network: &mut Network, gradients: &Gradients) {
        self.t += 1;
        let bias1 = 1.0 - self.beta1.powi(self.t);
        let bias2 = 1.0 - self.beta2.powi(self.t);

        let buffers = network
            .parameters_mut()
            .zip(gradients.slices())
            .zip(self.m.iter_mut().zip(&mut self.v));
        for ((params, grads), (m, v)) in buffers {
            debug_assert_eq!(params.len(), grads.len());
            for (((p, &g), m), v) in params.iter_mut().zip(grads).zip(m).zip(v) {
                *m = self.beta1 * *m + (1.0 - self.beta1) * g;
                *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
                let m_hat = *m / bias1;
                let v_hat = *v / bias2;
                *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
            }
        }
    }
}

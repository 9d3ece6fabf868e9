//! Fixed-topology feed-forward network.
//!
//! The network maps a batch of standardized [`FeatureVector`]s to hit
//! probabilities. Batches are stored row-major in flat `Vec<f32>` buffers
//! (`rows × width`), one row per sample.
//!
//! # Forward and Backward
//!
//! [`Network::forward`] keeps every intermediate activation in a
//! [`ForwardPass`] so that [`Network::backward`] can compute the gradient of
//! the mean binary cross-entropy with respect to every parameter. The output
//! sigmoid and the cross-entropy are differentiated together, which gives the
//! numerically stable output delta `(p - y) / rows`.
//!
//! # Dropout
//!
//! Each hidden layer is followed by ReLU and a dropout stage with its own rate.
//! Dropout is inverted: kept activations are scaled by `1 / (1 - rate)` during
//! training so that inference needs no rescaling. It is applied only in
//! [`Mode::Training`].

use lbw_data::feature::{FEATURE_COUNT, FeatureVector};
use rand::{Rng, RngCore};
use rand_distr::{Bernoulli, Distribution as _, Uniform};
use serde::{Deserialize, Serialize};

/// Widths of the network's layers, input first.
pub const LAYER_WIDTHS: [usize; 6] = [FEATURE_COUNT, 128, 64, 32, 16, 1];

/// Number of affine layers.
pub const LAYER_COUNT: usize = LAYER_WIDTHS.len() - 1;

/// Number of hidden layers (affine + ReLU + dropout).
pub const HIDDEN_LAYER_COUNT: usize = LAYER_COUNT - 1;

/// Dropout rate after each hidden layer.
pub const DEFAULT_DROPOUT: [f32; HIDDEN_LAYER_COUNT] = [0.2, 0.2, 0.0, 0.0];

/// Selects how a forward computation treats regularization.
pub enum Mode<'a> {
    /// Deterministic output; dropout disabled.
    Inference,
    /// Dropout masks are drawn from `rng`.
    Training { rng: &'a mut dyn RngCore },
}

/// A parameter set that does not fit the fixed topology.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ShapeError {
    #[display("expected {expected} layers, found {found}")]
    LayerCount { expected: usize, found: usize },
    #[display(
        "layer {layer}: expected {expected_in}→{expected_out}, found {found_in}→{found_out}"
    )]
    LayerShape {
        layer: usize,
        expected_in: usize,
        expected_out: usize,
        found_in: usize,
        found_out: usize,
    },
    #[display("layer {layer}: {found} {buffer} values, expected {expected}")]
    BufferLength {
        layer: usize,
        buffer: &'static str,
        expected: usize,
        found: usize,
    },
    #[display("layer {layer} contains a non-finite parameter")]
    NonFinite { layer: usize },
    #[display("dropout rate {rate} after hidden layer {layer} is outside [0, 1)")]
    DropoutRate { layer: usize, rate: f32 },
}

/// An affine layer `y = W·x + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linear {
    in_features: usize,
    out_features: usize,
    /// Row-major `out_features × in_features`.
    weight: Vec<f32>,
    bias: Vec<f32>,
}

impl Linear {
    /// Creates a layer with weights and biases drawn from
    /// `U(-1/√in_features, 1/√in_features)`.
    #[expect(clippy::cast_precision_loss)]
    pub fn random<R>(in_features: usize, out_features: usize, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        assert!(in_features > 0 && out_features > 0);
        let bound = 1.0 / (in_features as f32).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound).expect("bound is positive and finite");
        let weight = (0..in_features * out_features)
            .map(|_| dist.sample(rng))
            .collect();
        let bias = (0..out_features).map(|_| dist.sample(rng)).collect();
        Self {
            in_features,
            out_features,
            weight,
            bias,
        }
    }

    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// Row-major `out_features × in_features` weight matrix.
    #[must_use]
    pub fn weight(&self) -> &[f32] {
        &self.weight
    }

    #[must_use]
    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        let rows = input.len() / self.in_features;
        let mut output = Vec::with_capacity(rows * self.out_features);
        for x in input.chunks_exact(self.in_features) {
            for (w, b) in self.weight.chunks_exact(self.in_features).zip(&self.bias) {
                output.push(b + w.iter().zip(x).map(|(w, x)| w * x).sum::<f32>());
            }
        }
        output
    }

    fn validate(&self, layer: usize) -> Result<(), ShapeError> {
        let (expected_in, expected_out) = (LAYER_WIDTHS[layer], LAYER_WIDTHS[layer + 1]);
        if (self.in_features, self.out_features) != (expected_in, expected_out) {
            return Err(ShapeError::LayerShape {
                layer,
                expected_in,
                expected_out,
                found_in: self.in_features,
                found_out: self.out_features,
            });
        }
        for (buffer, expected, found) in [
            ("weight", expected_in * expected_out, self.weight.len()),
            ("bias", expected_out, self.bias.len()),
        ] {
            if expected != found {
                return Err(ShapeError::BufferLength {
                    layer,
                    buffer,
                    expected,
                    found,
                });
            }
        }
        if !self.weight.iter().chain(&self.bias).all(|v| v.is_finite()) {
            return Err(ShapeError::NonFinite { layer });
        }
        Ok(())
    }
}

/// The 13→128→64→32→16→1 hit predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    dropout: [f32; HIDDEN_LAYER_COUNT],
    layers: Vec<Linear>,
}

/// Activations of one hidden layer, kept for back-propagation.
#[derive(Debug, Clone)]
struct HiddenActivation {
    /// Post-ReLU, post-dropout values fed to the next layer.
    output: Vec<f32>,
    /// Per-element dropout factor (`0` or `1 / (1 - rate)`), if dropout ran.
    mask: Option<Vec<f32>>,
}

/// Intermediate values of one forward computation over a batch.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    rows: usize,
    input: Vec<f32>,
    hidden: Vec<HiddenActivation>,
    probabilities: Vec<f32>,
}

impl ForwardPass {
    /// Predicted hit probability for each row of the batch.
    #[must_use]
    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    #[must_use]
    pub fn into_probabilities(self) -> Vec<f32> {
        self.probabilities
    }
}

/// Gradient of one [`Linear`] layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub weight: Vec<f32>,
    pub bias: Vec<f32>,
}

/// Gradients for every parameter of a [`Network`].
///
/// [`Gradients::slices`] yields buffers in the same order as
/// [`Network::parameters_mut`].
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub layers: Vec<LinearGradient>,
}

impl Gradients {
    pub fn slices(&self) -> impl Iterator<Item = &[f32]> {
        self.layers
            .iter()
            .flat_map(|l| [l.weight.as_slice(), l.bias.as_slice()])
    }
}

impl Network {
    /// Creates a randomly initialized network with [`DEFAULT_DROPOUT`].
    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let layers = LAYER_WIDTHS
            .windows(2)
            .map(|w| Linear::random(w[0], w[1], rng))
            .collect();
        Self {
            dropout: DEFAULT_DROPOUT,
            layers,
        }
    }

    /// Replaces the dropout rates.
    pub fn with_dropout(mut self, dropout: [f32; HIDDEN_LAYER_COUNT]) -> Result<Self, ShapeError> {
        self.dropout = dropout;
        self.validate()?;
        Ok(self)
    }

    /// Checks layer shapes, parameter finiteness and dropout rates.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if self.layers.len() != LAYER_COUNT {
            return Err(ShapeError::LayerCount {
                expected: LAYER_COUNT,
                found: self.layers.len(),
            });
        }
        for (layer, linear) in self.layers.iter().enumerate() {
            linear.validate(layer)?;
        }
        for (layer, &rate) in self.dropout.iter().enumerate() {
            if !(0.0..1.0).contains(&rate) {
                return Err(ShapeError::DropoutRate { layer, rate });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn layers(&self) -> &[Linear] {
        &self.layers
    }

    #[must_use]
    pub fn dropout(&self) -> [f32; HIDDEN_LAYER_COUNT] {
        self.dropout
    }

    /// Total number of trainable values.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weight.len() + l.bias.len())
            .sum()
    }

    /// Mutable parameter buffers: weight then bias, layer by layer.
    pub fn parameters_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.layers
            .iter_mut()
            .flat_map(|l| [l.weight.as_mut_slice(), l.bias.as_mut_slice()])
    }

    /// Runs the network over a batch, keeping activations for [`Self::backward`].
    pub fn forward(&self, inputs: &[FeatureVector], mut mode: Mode<'_>) -> ForwardPass {
        let rows = inputs.len();
        let input = inputs.iter().flatten().copied().collect::<Vec<_>>();
        let (output_layer, hidden_layers) = self
            .layers
            .split_last()
            .expect("network has an output layer");

        let mut hidden = Vec::<HiddenActivation>::with_capacity(HIDDEN_LAYER_COUNT);
        for (layer, &rate) in hidden_layers.iter().zip(&self.dropout) {
            let previous = hidden.last().map_or(&input, |h| &h.output);
            let mut output = layer.forward(previous);
            for v in &mut output {
                *v = v.max(0.0);
            }

            let mask = match &mut mode {
                Mode::Training { rng } if rate > 0.0 => {
                    let rng: &mut dyn RngCore = &mut **rng;
                    let keep = Bernoulli::new(f64::from(1.0 - rate))
                        .expect("dropout rate is validated to lie in [0, 1)");
                    let factor = 1.0 / (1.0 - rate);
                    let mask = (0..output.len())
                        .map(|_| if keep.sample(rng) { factor } else { 0.0 })
                        .collect::<Vec<_>>();
                    for (v, m) in output.iter_mut().zip(&mask) {
                        *v *= m;
                    }
                    Some(mask)
                }
                _ => None,
            };
            hidden.push(HiddenActivation { output, mask });
        }

        let previous = hidden.last().map_or(&input, |h| &h.output);
        let probabilities = output_layer
            .forward(previous)
            .into_iter()
            .map(sigmoid)
            .collect();

        ForwardPass {
            rows,
            input,
            hidden,
            probabilities,
        }
    }

    /// Hit probabilities for a batch with dropout disabled.
    #[must_use]
    pub fn infer(&self, inputs: &[FeatureVector]) -> Vec<f32> {
        self.forward(inputs, Mode::Inference).into_probabilities()
    }

    /// Gradient of the mean binary cross-entropy of `pass` against `targets`.
    ///
    /// # Panics
    ///
    /// Panics if `targets` does not have one entry per batch row.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn backward(&self, pass: &ForwardPass, targets: &[f32]) -> Gradients {
        assert_eq!(targets.len(), pass.rows, "one target per batch row");
        let scale = 1.0 / pass.rows.max(1) as f32;
        let mut delta = pass
            .probabilities
            .iter()
            .zip(targets)
            .map(|(p, y)| (p - y) * scale)
            .collect::<Vec<_>>();

        let mut gradients = Vec::with_capacity(LAYER_COUNT);
        for (index, layer) in self.layers.iter().enumerate().rev() {
            let (n_in, n_out) = (layer.in_features, layer.out_features);
            let input = match index {
                0 => &pass.input,
                _ => &pass.hidden[index - 1].output,
            };

            let mut weight = vec![0.0; n_in * n_out];
            let mut bias = vec![0.0; n_out];
            for (d_row, x_row) in delta.chunks_exact(n_out).zip(input.chunks_exact(n_in)) {
                for ((&d, g_row), b) in d_row
                    .iter()
                    .zip(weight.chunks_exact_mut(n_in))
                    .zip(&mut bias)
                {
                    *b += d;
                    for (g, x) in g_row.iter_mut().zip(x_row) {
                        *g += d * x;
                    }
                }
            }
            gradients.push(LinearGradient { weight, bias });

            if index > 0 {
                let activation = &pass.hidden[index - 1];
                let mut previous = vec![0.0; pass.rows * n_in];
                for (p_row, d_row) in previous.chunks_exact_mut(n_in).zip(delta.chunks_exact(n_out)) {
                    for (&d, w_row) in d_row.iter().zip(layer.weight.chunks_exact(n_in)) {
                        for (p, w) in p_row.iter_mut().zip(w_row) {
                            *p += d * w;
                        }
                    }
                }
                // Through dropout and ReLU: a zero output had a zero derivative
                for (i, p) in previous.iter_mut().enumerate() {
                    if activation.output[i] <= 0.0 {
                        *p = 0.0;
                    } else if let Some(mask) = &activation.mask {
                        *p *= mask[i];
                    }
                }
                delta = previous;
            }
        }
        gradients.reverse();

        Gradients { layers: gradients }
    }
}

/// Logistic function, stable for large `|z|`.
#[must_use]
pub fn sigmoid(z: f32) -> f32 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

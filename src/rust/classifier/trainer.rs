use std::collections::HashMap;

use log::{debug, info, warn};
use ndarray::{Array1, Array2};

use super::error::{CategorizerError, Result};
use super::model::LogisticRegression;
use super::utils::log_sum_exp;
use crate::categories::CategoryRegistry;
use crate::config::{ClassWeight, TrainingConfig};
use crate::vectorizer::SparseVector;

/// Outcome of one optimizer run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    pub converged: bool,
    /// Regularized, class-weighted negative log-likelihood at the returned parameters
    pub loss: f64,
}

/// Per-sample loss weights for the configured weighting mode.
pub(crate) fn sample_weights(targets: &[usize], num_classes: usize, mode: ClassWeight) -> Vec<f64> {
    match mode {
        ClassWeight::Uniform => vec![1.0; targets.len()],
        ClassWeight::Balanced => {
            let mut counts = vec![0usize; num_classes];
            for &t in targets {
                counts[t] += 1;
            }
            let n = targets.len() as f64;
            targets
                .iter()
                .map(|&t| n / (num_classes as f64 * counts[t] as f64))
                .collect()
        }
    }
}

/// Class-weighted softmax loss with an L2 penalty on the weight block of `theta`.
///
/// `theta` is the `K x D` weight matrix in row-major order followed by `K` biases.
struct Objective<'a> {
    features: &'a [SparseVector],
    targets: &'a [usize],
    sample_weight: &'a [f64],
    num_classes: usize,
    num_features: usize,
    alpha: f64,
}

impl Objective<'_> {
    /// Returns the objective at `x` and writes its gradient into `gx`.
    fn evaluate(&self, x: &[f64], gx: &mut [f64]) -> f64 {
        let (k, d) = (self.num_classes, self.num_features);
        gx.fill(0.0);
        let (w, b) = x.split_at(k * d);
        let (gw, gb) = gx.split_at_mut(k * d);
        let mut loss = 0.0;
        let mut scores = Array1::<f64>::zeros(k);

        for ((xi, &yi), &si) in self.features.iter().zip(self.targets).zip(self.sample_weight) {
            for c in 0..k {
                scores[c] = xi.dot(&w[c * d..(c + 1) * d]) + b[c];
            }
            let lse = log_sum_exp(&scores);
            loss += si * (lse - scores[yi]);

            for c in 0..k {
                let indicator = if c == yi { 1.0 } else { 0.0 };
                let residual = si * ((scores[c] - lse).exp() - indicator);
                gb[c] += residual;
                let row = &mut gw[c * d..(c + 1) * d];
                for (j, v) in xi.iter() {
                    row[j] += residual * v;
                }
            }
        }

        for (g, &wv) in gw.iter_mut().zip(w) {
            *g += self.alpha * wv;
            loss += 0.5 * self.alpha * wv * wv;
        }
        loss
    }
}

fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Fits a multinomial logistic regression with L-BFGS.
///
/// Minimizes `sum_i s_i * -ln P(y_i | x_i) + ||W||^2 / (2C)` over weights `W` and biases
/// (biases are not penalized). Categories are the registry members present in `labels`, in
/// registry order. Hitting the iteration cap or a line-search failure is not an error: the
/// parameters with the lowest objective seen are kept. `converged` reports whether those
/// parameters pass the L-BFGS gradient test, `||g|| / max(1, ||x||) <= epsilon`.
///
/// # Errors
/// - `TrainingData` if fewer than two distinct categories are present, a label is outside
///   the registry, or `features` and `labels` differ in length
pub fn fit<S: AsRef<str>>(
    features: &[SparseVector],
    labels: &[S],
    num_features: usize,
    registry: &CategoryRegistry,
    config: &TrainingConfig,
) -> Result<(LogisticRegression, FitReport)> {
    if features.len() != labels.len() {
        return Err(CategorizerError::TrainingData(format!(
            "{} feature vectors but {} labels",
            features.len(),
            labels.len()
        )));
    }
    if let Some(label) = labels.iter().find(|l| !registry.contains(l.as_ref())) {
        return Err(CategorizerError::TrainingData(format!(
            "Label '{}' is not a registered category",
            label.as_ref()
        )));
    }

    let categories = registry.ordered_subset(labels.iter().map(|l| l.as_ref()));
    if categories.len() < 2 {
        return Err(CategorizerError::TrainingData(format!(
            "At least 2 distinct categories are required, found {}",
            categories.len()
        )));
    }

    let position: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();
    let targets: Vec<usize> = labels.iter().map(|l| position[l.as_ref()]).collect();

    let k = categories.len();
    let d = num_features;
    let weights_len = k * d;
    let sample_weight = sample_weights(&targets, k, config.class_weight());
    let alpha = 1.0 / config.c();

    let objective = Objective {
        features,
        targets: &targets,
        sample_weight: &sample_weight,
        num_classes: k,
        num_features: d,
        alpha,
    };

    let mut theta = vec![0.0; weights_len + k];
    let mut best_theta = theta.clone();
    let mut best_loss = f64::INFINITY;
    let mut evaluations = 0usize;
    let mut reported = 0usize;

    let evaluate = |x: &[f64], gx: &mut [f64]| -> std::result::Result<f64, anyhow::Error> {
        evaluations += 1;
        let loss = objective.evaluate(x, gx);
        if loss < best_loss {
            best_loss = loss;
            best_theta.copy_from_slice(x);
        }
        Ok(loss)
    };

    let progress = |prgr: &liblbfgs::Progress| -> bool {
        reported += 1;
        debug!(
            "Iteration {}: loss = {:.6}, ||x|| = {:.6}, ||g|| = {:.6}",
            prgr.niter, prgr.fx, prgr.xnorm, prgr.gnorm
        );
        false // continue optimization
    };

    let outcome = liblbfgs::lbfgs()
        .with_max_iterations(config.max_iterations())
        .with_epsilon(config.epsilon())
        .minimize(&mut theta, evaluate, progress);

    // The step that trips a stopping test is never passed to `progress`.
    let iterations = match outcome {
        Ok(_) if evaluations > 1 => reported + 1,
        Ok(_) => 0,
        Err(e) => {
            warn!("L-BFGS stopped early: {}", e);
            reported
        }
    }
    .min(config.max_iterations());

    let mut gradient = vec![0.0; best_theta.len()];
    objective.evaluate(&best_theta, &mut gradient);
    let gnorm = l2_norm(&gradient);
    let xnorm = l2_norm(&best_theta);
    let converged = gnorm / xnorm.max(1.0) <= config.epsilon();
    if !converged {
        warn!(
            "Optimizer did not converge after {} of {} iterations (||g|| = {:.3e}); using best iterate (loss {:.6})",
            iterations,
            config.max_iterations(),
            gnorm,
            best_loss
        );
    }
    info!(
        "Fitted {} categories x {} features in {} iterations (loss {:.6})",
        k, d, iterations, best_loss
    );

    let weights = Array2::from_shape_vec((k, d), best_theta[..weights_len].to_vec())
        .map_err(|e| CategorizerError::TrainingData(e.to_string()))?;
    let bias = Array1::from(best_theta[weights_len..].to_vec());
    let model = LogisticRegression::from_parts(categories, weights, bias)?;

    Ok((
        model,
        FitReport {
            iterations,
            converged,
            loss: best_loss,
        },
    ))
}

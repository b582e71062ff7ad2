//! L2-regularized logistic regression with balanced class weights

use crate::config::TrainingConfig;
use crate::error::{ExoplanetError, Result};
use crate::types::Label;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Per-row weights `n / (n_classes * n_class)` so both classes contribute equally
pub fn balanced_sample_weights(y: &[Label]) -> Vec<f64> {
    let n = y.len() as f64;
    let positives = y.iter().filter(|&&l| l == 1).count() as f64;
    let negatives = n - positives;
    let n_classes = [positives, negatives].iter().filter(|&&c| c > 0.0).count() as f64;

    y.iter()
        .map(|&l| {
            let count = if l == 1 { positives } else { negatives };
            n / (n_classes * count)
        })
        .collect()
}

/// Binary logistic regression fitted by batch gradient descent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Vec<f64>,
    intercept: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    /// L2 regularization strength
    pub alpha: f64,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: Vec::new(),
            intercept: 0.0,
            learning_rate: 0.1,
            max_iter: 1000,
            alpha: 1e-4,
            tol: 1e-6,
            is_fitted: false,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self {
            learning_rate: config.learning_rate,
            max_iter: config.max_iter,
            alpha: config.l2_penalty,
            ..Self::new()
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Fit using gradient descent on the weighted log-loss
    pub fn fit(&mut self, x: &Array2<f64>, y: &[Label]) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(ExoplanetError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ExoplanetError::insufficient(
                "fit",
                "cannot fit logistic regression on zero rows",
            ));
        }

        let targets = Array1::from_iter(y.iter().map(|&l| f64::from(l)));
        let sample_weights = Array1::from_vec(balanced_sample_weights(y));
        let weight_sum = sample_weights.sum();

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;

        for iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = linear.mapv(sigmoid);

            let errors = (&predictions - &targets) * &sample_weights;
            let dw = x.t().dot(&errors) / weight_sum + self.alpha * &weights;
            let db = errors.sum() / weight_sum;

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                log::debug!("Logistic regression converged after {} iterations", iter);
                break;
            }

            weights = weights - self.learning_rate * dw;
            bias -= self.learning_rate * db;
        }

        self.coefficients = weights.to_vec();
        self.intercept = bias;
        self.is_fitted = true;
        Ok(())
    }

    /// Positive-class probabilities
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(ExoplanetError::ModelNotFitted);
        }
        if x.ncols() != self.coefficients.len() {
            return Err(ExoplanetError::FeatureCountMismatch {
                expected: self.coefficients.len(),
                actual: x.ncols(),
            });
        }

        let coefficients = Array1::from_vec(self.coefficients.clone());
        Ok((x.dot(&coefficients) + self.intercept).mapv(sigmoid))
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<Label>> {
        Ok(self
            .predict_proba(x)?
            .iter()
            .map(|&p| Label::from(p > 0.5))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_balanced_weights() {
        let weights = balanced_sample_weights(&[0, 0, 0, 1]);
        // 4 / (2 * 3) and 4 / (2 * 1)
        assert_relative_eq!(weights[0], 4.0 / 6.0);
        assert_relative_eq!(weights[3], 2.0);
        let total: f64 = weights.iter().sum();
        assert_relative_eq!(total, 4.0);
    }

    #[test]
    fn test_logistic_regression_separates_line() {
        let x = array![[-3.0], [-2.0], [-1.0], [1.0], [2.0], [3.0]];
        let y = vec![0, 0, 0, 1, 1, 1];

        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x).unwrap(), y);
        assert!(model.coefficients()[0] > 0.0);

        let proba = model.predict_proba(&array![[0.0]]).unwrap();
        assert_relative_eq!(proba[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = LogisticRegression::new();
        assert!(matches!(
            model.predict_proba(&array![[1.0]]),
            Err(ExoplanetError::ModelNotFitted)
        ));
    }
}

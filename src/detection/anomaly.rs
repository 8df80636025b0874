//! Anomaly-detection model for transaction scoring.
//!
//! Provides the one-class classifier behind the fraud check endpoint. The model
//! is fitted offline from a CSV of historical transactions and consumed as an
//! opaque scorer: callers hand it a fixed four-feature vector and get back a
//! boolean verdict plus a human-readable message.
//!
//! Fitting estimates a per-feature Gaussian envelope (mean and deviation) and
//! scores points by their squared z-score distance from the center. The decision
//! threshold is calibrated so that a `nu` fraction of the training data falls
//! outside it, matching the contamination contract of the one-class model the
//! training data was originally built for.

use std::{
    fs::{self, File},
    io::{self, BufReader},
    path::Path,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verdict message for flagged transactions.
pub const SUSPICIOUS_MESSAGE: &str = "Suspicious transaction detected!";
/// Verdict message for unremarkable transactions.
pub const NORMAL_MESSAGE: &str = "Transaction appears normal.";

/// Number of features in the model's input vector.
pub const FEATURE_COUNT: usize = 4;

/// Fraction of training points allowed to fall outside the decision boundary.
const DEFAULT_NU: f64 = 0.05;

/// Minimum usable training rows for a meaningful fit.
const MIN_TRAINING_ROWS: usize = 10;

/// Errors that can occur while fitting, caching, or loading the model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Training data or cache file could not be read or written.
    #[error("model file I/O failed: {0}")]
    Io(#[from] io::Error),
    /// Training CSV could not be parsed.
    #[error("failed to parse training data: {0}")]
    Csv(#[from] csv::Error),
    /// Model cache could not be (de)serialized.
    #[error("failed to (de)serialize model cache: {0}")]
    Cache(#[from] serde_json::Error),
    /// Not enough rows to fit the model.
    #[error("training data has only {0} usable rows")]
    TooFewSamples(usize),
}

/// The fixed feature vector scored by the model.
///
/// Field order is part of the model contract: `[amount, customer_age,
/// login_attempts, account_balance]`, matching the column order used during
/// training.
#[derive(Debug, Clone, Copy)]
pub struct TransactionFeatures {
    pub amount: f64,
    pub customer_age: f64,
    pub login_attempts: f64,
    pub account_balance: f64,
}

impl TransactionFeatures {
    /// Returns the features in training column order.
    pub fn as_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.amount,
            self.customer_age,
            self.login_attempts,
            self.account_balance,
        ]
    }
}

/// Classifier output: the suspicious flag plus its display message.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    /// Whether the transaction fell outside the decision boundary
    pub is_suspicious: bool,
    /// Squared z-score distance from the training center
    pub score: f64,
    /// Human-readable verdict
    pub message: String,
}

/// One row of the training CSV.
///
/// Header names match the original training data export.
#[derive(Debug, Deserialize)]
struct TrainingRecord {
    #[serde(rename = "TransactionAmount")]
    amount: f64,
    #[serde(rename = "CustomerAge")]
    customer_age: f64,
    #[serde(rename = "LoginAttempts")]
    login_attempts: f64,
    #[serde(rename = "AccountBalance")]
    account_balance: f64,
}

/// Fitted anomaly-detection model.
///
/// Serializable so a fitted model can be cached to disk and reloaded at boot
/// without retraining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyDetector {
    /// Per-feature training mean
    means: [f64; FEATURE_COUNT],
    /// Per-feature training deviation (1.0 for constant columns)
    scales: [f64; FEATURE_COUNT],
    /// Decision boundary on the squared z-score distance
    threshold: f64,
    /// Contamination fraction used during calibration
    nu: f64,
}

impl AnomalyDetector {
    /// Fits the model on raw feature vectors with the default contamination.
    pub fn fit(samples: &[[f64; FEATURE_COUNT]]) -> Result<Self, ModelError> {
        Self::fit_with_nu(samples, DEFAULT_NU)
    }

    /// Fits the model on raw feature vectors.
    ///
    /// The decision threshold is set at the `1 - nu` quantile of the training
    /// distances, so roughly a `nu` fraction of the training set scores as
    /// suspicious.
    pub fn fit_with_nu(samples: &[[f64; FEATURE_COUNT]], nu: f64) -> Result<Self, ModelError> {
        if samples.len() < MIN_TRAINING_ROWS {
            return Err(ModelError::TooFewSamples(samples.len()));
        }

        let n = samples.len() as f64;
        let mut means = [0.0; FEATURE_COUNT];
        for sample in samples {
            for (mean, value) in means.iter_mut().zip(sample) {
                *mean += value / n;
            }
        }

        let mut scales = [0.0; FEATURE_COUNT];
        for sample in samples {
            for ((scale, mean), value) in scales.iter_mut().zip(&means).zip(sample) {
                *scale += (value - mean).powi(2) / n;
            }
        }
        for scale in scales.iter_mut() {
            let deviation = scale.sqrt();
            // Constant columns carry no signal; a unit scale keeps them inert.
            *scale = if deviation > f64::EPSILON { deviation } else { 1.0 };
        }

        let mut distances: Vec<f64> = samples
            .iter()
            .map(|s| squared_distance(s, &means, &scales))
            .collect();
        distances.sort_by(|a, b| a.total_cmp(b));

        let idx = (((1.0 - nu) * distances.len() as f64).ceil() as usize)
            .clamp(1, distances.len())
            - 1;
        let threshold = distances[idx];

        Ok(Self {
            means,
            scales,
            threshold,
            nu,
        })
    }

    /// Fits the model from a CSV source with `TransactionAmount`, `CustomerAge`,
    /// `LoginAttempts`, and `AccountBalance` columns.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> Result<Self, ModelError> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut samples = Vec::new();
        for record in rdr.deserialize::<TrainingRecord>() {
            let record = record?;
            samples.push([
                record.amount,
                record.customer_age,
                record.login_attempts,
                record.account_balance,
            ]);
        }
        Self::fit(&samples)
    }

    /// Fits the model from a training CSV on disk.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    /// Loads a previously cached model.
    pub fn load_cache<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Writes the fitted model to a cache file, creating parent directories.
    pub fn save_cache<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Loads the cached model when present, otherwise trains from the CSV and
    /// caches the result for later boots.
    pub fn load_or_train(csv_path: &str, cache_path: &str) -> Result<Self, ModelError> {
        if Path::new(cache_path).exists() {
            let model = Self::load_cache(cache_path)?;
            tracing::info!(cache = %cache_path, "Loaded cached anomaly model");
            return Ok(model);
        }

        let model = Self::from_csv_file(csv_path)?;
        model.save_cache(cache_path)?;
        tracing::info!(
            training_data = %csv_path,
            cache = %cache_path,
            threshold = model.threshold,
            "Anomaly model trained and cached"
        );
        Ok(model)
    }

    /// Squared z-score distance of a feature vector from the training center.
    pub fn score(&self, features: &TransactionFeatures) -> f64 {
        squared_distance(&features.as_vector(), &self.means, &self.scales)
    }

    /// Scores a feature vector and renders the verdict.
    pub fn assess(&self, features: &TransactionFeatures) -> Verdict {
        let score = self.score(features);
        let is_suspicious = score > self.threshold;
        Verdict {
            is_suspicious,
            score,
            message: if is_suspicious {
                SUSPICIOUS_MESSAGE.to_string()
            } else {
                NORMAL_MESSAGE.to_string()
            },
        }
    }

    /// The calibrated decision boundary.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

fn squared_distance(
    sample: &[f64; FEATURE_COUNT],
    means: &[f64; FEATURE_COUNT],
    scales: &[f64; FEATURE_COUNT],
) -> f64 {
    sample
        .iter()
        .zip(means)
        .zip(scales)
        .map(|((value, mean), scale)| ((value - mean) / scale).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic cluster of plausible transactions spread across all features.
    fn training_cluster() -> Vec<[f64; FEATURE_COUNT]> {
        (0..40)
            .map(|i| {
                let i = i as f64;
                [
                    1500.0 + (i * 37.0) % 1000.0,
                    25.0 + (i as i64 % 40) as f64,
                    1.0 + (i as i64 % 3) as f64,
                    5000.0 + (i * 211.0) % 8000.0,
                ]
            })
            .collect()
    }

    fn center() -> TransactionFeatures {
        TransactionFeatures {
            amount: 2000.0,
            customer_age: 40.0,
            login_attempts: 2.0,
            account_balance: 8000.0,
        }
    }

    #[test]
    fn typical_transaction_is_normal() {
        let model = AnomalyDetector::fit(&training_cluster()).unwrap();
        let verdict = model.assess(&center());
        assert!(!verdict.is_suspicious);
        assert_eq!(verdict.message, NORMAL_MESSAGE);
    }

    #[test]
    fn extreme_transaction_is_flagged() {
        let model = AnomalyDetector::fit(&training_cluster()).unwrap();
        let verdict = model.assess(&TransactionFeatures {
            amount: 50_000.0,
            customer_age: 18.0,
            login_attempts: 40.0,
            account_balance: 100_000.0,
        });
        assert!(verdict.is_suspicious);
        assert_eq!(verdict.message, SUSPICIOUS_MESSAGE);
        assert!(verdict.score > model.threshold());
    }

    #[test]
    fn rejects_tiny_training_set() {
        let samples = vec![[1.0, 2.0, 3.0, 4.0]; 3];
        match AnomalyDetector::fit(&samples) {
            Err(ModelError::TooFewSamples(3)) => {}
            other => panic!("expected TooFewSamples, got {other:?}"),
        }
    }

    #[test]
    fn constant_column_does_not_poison_fit() {
        let samples: Vec<_> = training_cluster()
            .into_iter()
            .map(|mut s| {
                s[2] = 1.0;
                s
            })
            .collect();
        let model = AnomalyDetector::fit(&samples).unwrap();
        // A wild value in the constant column alone moves the score.
        let mut odd = center();
        odd.login_attempts = 500.0;
        assert!(model.assess(&odd).is_suspicious);
    }

    #[test]
    fn fits_from_csv_with_original_headers() {
        let mut csv = String::from(
            "TransactionAmount,CustomerAge,LoginAttempts,AccountBalance\n",
        );
        for sample in training_cluster() {
            csv.push_str(&format!(
                "{},{},{},{}\n",
                sample[0], sample[1], sample[2], sample[3]
            ));
        }
        let model = AnomalyDetector::from_csv_reader(csv.as_bytes()).unwrap();
        assert!(!model.assess(&center()).is_suspicious);
    }

    #[test]
    fn cache_round_trip_preserves_verdicts() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("model.json");

        let model = AnomalyDetector::fit(&training_cluster()).unwrap();
        model.save_cache(&cache).unwrap();
        let reloaded = AnomalyDetector::load_cache(&cache).unwrap();

        assert_eq!(model.threshold(), reloaded.threshold());
        let probe = TransactionFeatures {
            amount: 42_000.0,
            customer_age: 19.0,
            login_attempts: 25.0,
            account_balance: 50.0,
        };
        assert_eq!(
            model.assess(&probe).is_suspicious,
            reloaded.assess(&probe).is_suspicious
        );
    }

    #[test]
    fn roughly_nu_fraction_of_training_data_is_flagged() {
        let samples = training_cluster();
        let model = AnomalyDetector::fit_with_nu(&samples, 0.1).unwrap();
        let flagged = samples
            .iter()
            .filter(|s| {
                model
                    .assess(&TransactionFeatures {
                        amount: s[0],
                        customer_age: s[1],
                        login_attempts: s[2],
                        account_balance: s[3],
                    })
                    .is_suspicious
            })
            .count();
        assert!(flagged <= samples.len() / 10 + 1, "flagged {flagged}");
    }
}
